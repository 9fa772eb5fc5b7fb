//! Icon address resolution
//!
//! Maps an icon number to the sprite sheet, grid cell and pixel rectangles
//! that hold its artwork. Regular icons live on split sheets of 80x30
//! cells (normal sprite on the left half, shiny on the right); eggs live on
//! a single sheet of 30x32 cells. Custom icons are reached through the
//! [`CustomIconTable`] when the caller asks for a custom lookup.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::SheetsConfig;
use crate::table::CustomIconTable;

/// First icon number of the egg range.
pub const EGG_START: i64 = 1451;
/// Last icon number resolved with the first egg base offset.
pub const EGG_VARIANT_A_LAST: i64 = 1872;
/// Base offset for egg numbers above [`EGG_VARIANT_A_LAST`].
pub const EGG_VARIANT_B_OFFSET: i64 = 1442;

/// Columns in the logical regular grid (before sheet splitting).
pub const REGULAR_COLUMNS: u64 = 21;
/// Columns on the egg sheet.
pub const EGG_COLUMNS: u64 = 18;

/// Width of a regular cell (normal + shiny sprite).
pub const REGULAR_CELL_WIDTH: u32 = 80;
/// Height of a regular cell.
pub const REGULAR_CELL_HEIGHT: u32 = 30;
/// Width of one regular sprite inside a cell.
pub const SPRITE_WIDTH: u32 = 40;
/// Width of an egg cell.
pub const EGG_CELL_WIDTH: u32 = 30;
/// Height of an egg cell.
pub const EGG_CELL_HEIGHT: u32 = 32;

/// Conventional first custom slot key. Lower keys are allowed but warned about.
pub const FIRST_CUSTOM_SLOT: u32 = 1145;

/// Error resolving an icon number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Icon numbers are non-negative
    #[error("Icon number {0} is out of domain (must be >= 0)")]
    OutOfDomain(i64),
    /// No sheet asset and no custom entry can serve this icon
    #[error("No sheet asset or custom entry found for icon {0}")]
    NotFound(i64),
}

/// Which external sheet an icon lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetId {
    /// Regular sheet, indexed from 1 by the splitting transform
    Regular(u8),
    /// The single egg sheet
    Egg,
}

impl SheetId {
    /// Declared grid bounds of this sheet.
    ///
    /// Odd regular sheets hold logical columns 0-10, even ones columns
    /// 11-20. Row counts follow the 25 / 33 row split of the logical grid;
    /// the last pair holds whatever remains below row 57.
    pub fn grid(&self) -> SheetGrid {
        match self {
            SheetId::Egg => SheetGrid { columns: EGG_COLUMNS, rows: None },
            SheetId::Regular(index) => {
                let columns = if index % 2 == 1 { 11 } else { 10 };
                let rows = match index {
                    1 | 2 => 25,
                    3 | 4 => 33,
                    _ => 12,
                };
                SheetGrid { columns, rows: Some(rows) }
            }
        }
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetId::Regular(index) => write!(f, "regular-{}", index),
            SheetId::Egg => write!(f, "egg"),
        }
    }
}

/// Grid bounds of one sheet. Egg rows are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGrid {
    pub columns: u64,
    pub rows: Option<u64>,
}

impl SheetGrid {
    /// Returns true if the cell lies inside the declared bounds.
    pub fn contains(&self, column: u64, row: u64) -> bool {
        column < self.columns && self.rows.map_or(true, |rows| row < rows)
    }
}

/// A rectangle in sheet pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RectPx {
    pub x: u64,
    pub y: u64,
    pub width: u32,
    pub height: u32,
}

impl RectPx {
    pub fn new(x: u64, y: u64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (x + width).
    pub fn right(&self) -> u64 {
        self.x + self.width as u64
    }

    /// Bottom edge (y + height).
    pub fn bottom(&self) -> u64 {
        self.y + self.height as u64
    }
}

/// Where an icon's artwork lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionDescriptor {
    pub sheet: SheetId,
    /// Column within `sheet`
    pub column: u64,
    /// Row within `sheet`
    pub row: u64,
    /// Column in the logical (unsplit) grid
    pub grid_column: u64,
    /// Row in the logical (unsplit) grid
    pub grid_row: u64,
    pub normal: RectPx,
    /// Absent for eggs, which have a single sprite
    pub shiny: Option<RectPx>,
}

impl RegionDescriptor {
    /// The rect for the requested variant. Eggs always answer with their only rect.
    pub fn rect(&self, shiny: bool) -> RectPx {
        match (shiny, self.shiny) {
            (true, Some(rect)) => rect,
            _ => self.normal,
        }
    }

    pub fn is_egg(&self) -> bool {
        self.sheet == SheetId::Egg
    }
}

/// Resolve an icon number to its sheet region.
///
/// Fails only for negative numbers: every non-negative number falls in
/// either the regular or the egg range.
///
/// # Examples
///
/// ```
/// use iconsheet::resolver::{resolve, RectPx, SheetId};
///
/// let mew = resolve(151).unwrap();
/// assert_eq!(mew.sheet, SheetId::Regular(1));
/// assert_eq!(mew.normal, RectPx::new(320, 210, 40, 30));
/// assert_eq!(mew.shiny, Some(RectPx::new(360, 210, 40, 30)));
/// ```
pub fn resolve(icon: i64) -> Result<RegionDescriptor, ResolveError> {
    if icon < 0 {
        return Err(ResolveError::OutOfDomain(icon));
    }
    if icon >= EGG_START {
        Ok(resolve_egg(icon))
    } else {
        Ok(resolve_regular(icon as u64))
    }
}

fn resolve_egg(icon: i64) -> RegionDescriptor {
    // Two historical egg sheets were merged into one coordinate space, each
    // keeping its own base offset.
    let base: i64 = match icon {
        n if n > EGG_VARIANT_A_LAST => n - EGG_VARIANT_B_OFFSET,
        n => n - EGG_START,
    };
    let base = base as u64;
    let column = base % EGG_COLUMNS;
    let row = base / EGG_COLUMNS;

    RegionDescriptor {
        sheet: SheetId::Egg,
        column,
        row,
        grid_column: column,
        grid_row: row,
        normal: RectPx::new(
            column * EGG_CELL_WIDTH as u64,
            row * EGG_CELL_HEIGHT as u64,
            EGG_CELL_WIDTH,
            EGG_CELL_HEIGHT,
        ),
        shiny: None,
    }
}

fn resolve_regular(icon: u64) -> RegionDescriptor {
    let grid_column = icon % REGULAR_COLUMNS;
    let grid_row = icon / REGULAR_COLUMNS;
    let (index, column, row) = split_sheet(grid_column, grid_row);

    let x = column * REGULAR_CELL_WIDTH as u64;
    let y = row * REGULAR_CELL_HEIGHT as u64;

    RegionDescriptor {
        sheet: SheetId::Regular(index),
        column,
        row,
        grid_column,
        grid_row,
        normal: RectPx::new(x, y, SPRITE_WIDTH, REGULAR_CELL_HEIGHT),
        shiny: Some(RectPx::new(x + SPRITE_WIDTH as u64, y, SPRITE_WIDTH, REGULAR_CELL_HEIGHT)),
    }
}

/// Split a logical regular grid cell onto its physical sheet.
///
/// Returns `(sheet_index, column, row)`. Each row check sees the row as
/// already adjusted by the check before it.
pub fn split_sheet(column: u64, row: u64) -> (u8, u64, u64) {
    let mut index = 1u8;
    let mut column = column;
    let mut row = row;

    if column > 10 {
        index += 1;
        column -= 11;
    }
    if row > 24 {
        index += 2;
        row -= 25;
    }
    if row > 32 {
        index += 2;
        row -= 33;
    }

    (index, column, row)
}

/// How the caller wants an icon number interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookup {
    /// Sheet geometry only
    #[default]
    Geometric,
    /// Consult the custom table first (keyed `icon + 1`), then geometry
    Custom,
}

/// A resolved asset the runtime can load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum AssetReference {
    /// A rect inside one of the fixed sheet assets
    Sheet { asset_id: String, sheet: SheetId, rect: RectPx },
    /// A standalone asset from the custom table
    Custom { asset_id: String, slot: u32, label: String },
}

impl AssetReference {
    pub fn asset_id(&self) -> &str {
        match self {
            AssetReference::Sheet { asset_id, .. } | AssetReference::Custom { asset_id, .. } => {
                asset_id
            }
        }
    }

    /// Asset id with the platform prefix, e.g. `rbxassetid://17134745575`.
    pub fn uri(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.asset_id())
    }
}

/// Resolve an icon to the asset the runtime should display.
///
/// With [`Lookup::Custom`] the table entry at `icon + 1` wins when it has an
/// asset for the requested variant; otherwise resolution falls through to
/// sheet geometry. A sheet without a configured asset yields
/// [`ResolveError::NotFound`].
pub fn resolve_icon(
    icon: i64,
    shiny: bool,
    lookup: Lookup,
    table: &CustomIconTable,
    sheets: &SheetsConfig,
) -> Result<AssetReference, ResolveError> {
    if icon < 0 {
        return Err(ResolveError::OutOfDomain(icon));
    }

    if lookup == Lookup::Custom {
        if let Some(reference) = custom_reference(icon, shiny, table) {
            return Ok(reference);
        }
        debug!(icon, shiny, "no custom asset, falling back to sheet geometry");
    }

    let region = resolve(icon)?;
    let asset_id = sheets.asset_for(region.sheet).ok_or(ResolveError::NotFound(icon))?;
    Ok(AssetReference::Sheet {
        asset_id: asset_id.to_string(),
        sheet: region.sheet,
        rect: region.rect(shiny),
    })
}

fn custom_reference(icon: i64, shiny: bool, table: &CustomIconTable) -> Option<AssetReference> {
    let slot = u32::try_from(icon.checked_add(1)?).ok()?;
    let entry = table.get(slot)?;
    let asset_id = if shiny { entry.shiny.as_ref()? } else { &entry.normal };
    Some(AssetReference::Custom { asset_id: asset_id.clone(), slot, label: entry.label.clone() })
}

/// One row of a position export.
#[derive(Debug, Clone, Serialize)]
pub struct IconPosition {
    pub icon_number: i64,
    pub kind: &'static str,
    pub sheet: String,
    pub column: u64,
    pub row: u64,
    pub grid_column: u64,
    pub grid_row: u64,
    pub x_normal: u64,
    pub x_shiny: Option<u64>,
    pub y: u64,
    pub width: u32,
    pub height: u32,
    pub asset_id: String,
}

impl IconPosition {
    pub fn new(icon: i64, region: &RegionDescriptor, sheets: &SheetsConfig) -> Self {
        Self {
            icon_number: icon,
            kind: if region.is_egg() { "egg" } else { "regular" },
            sheet: region.sheet.to_string(),
            column: region.column,
            row: region.row,
            grid_column: region.grid_column,
            grid_row: region.grid_row,
            x_normal: region.normal.x,
            x_shiny: region.shiny.map(|r| r.x),
            y: region.normal.y,
            width: region.normal.width,
            height: region.normal.height,
            asset_id: sheets.asset_for(region.sheet).unwrap_or_default().to_string(),
        }
    }
}

/// Resolve every icon in `range`.
pub fn positions(
    range: RangeInclusive<i64>,
    sheets: &SheetsConfig,
) -> Result<Vec<IconPosition>, ResolveError> {
    range.map(|icon| resolve(icon).map(|region| IconPosition::new(icon, &region, sheets))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CustomIconEntry;

    fn entry(slot: u32, normal: &str, shiny: Option<&str>, label: &str) -> CustomIconEntry {
        CustomIconEntry {
            slot_key: slot,
            normal: normal.to_string(),
            shiny: shiny.map(String::from),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_resolve_zero() {
        let region = resolve(0).unwrap();
        assert_eq!(region.sheet, SheetId::Regular(1));
        assert_eq!((region.column, region.row), (0, 0));
        assert_eq!(region.normal, RectPx::new(0, 0, 40, 30));
        assert_eq!(region.shiny, Some(RectPx::new(40, 0, 40, 30)));
    }

    #[test]
    fn test_resolve_second_row() {
        let region = resolve(21).unwrap();
        assert_eq!(region.sheet, SheetId::Regular(1));
        assert_eq!((region.column, region.row), (0, 1));
        assert_eq!(region.normal, RectPx::new(0, 30, 40, 30));
    }

    #[test]
    fn test_resolve_column_eleven_moves_to_second_sheet() {
        let region = resolve(11).unwrap();
        assert_eq!(region.sheet, SheetId::Regular(2));
        assert_eq!((region.column, region.row), (0, 0));
        assert_eq!(region.grid_column, 11);
        assert_eq!(region.normal, RectPx::new(0, 0, 40, 30));
    }

    #[test]
    fn test_resolve_column_ten_stays_on_first_sheet() {
        let region = resolve(10).unwrap();
        assert_eq!(region.sheet, SheetId::Regular(1));
        assert_eq!(region.column, 10);
        assert_eq!(region.normal.x, 800);
    }

    #[test]
    fn test_column_eleven_never_first_sheet_group() {
        for row in 0..69 {
            let icon = row * 21 + 11;
            let region = resolve(icon).unwrap();
            match region.sheet {
                SheetId::Regular(index) => assert_eq!(index % 2, 0, "icon {}", icon),
                SheetId::Egg => panic!("icon {} resolved to egg", icon),
            }
            assert_eq!(region.column, 0);
        }
    }

    #[test]
    fn test_resolve_mew() {
        let region = resolve(151).unwrap();
        assert_eq!(region.sheet, SheetId::Regular(1));
        assert_eq!((region.column, region.row), (4, 7));
        assert_eq!(region.normal, RectPx::new(320, 210, 40, 30));
        assert_eq!(region.shiny, Some(RectPx::new(360, 210, 40, 30)));
    }

    #[test]
    fn test_row_boundaries() {
        // Row 24 is the last row of the first pair, row 25 opens the second.
        assert_eq!(resolve(24 * 21).unwrap().sheet, SheetId::Regular(1));
        let region = resolve(25 * 21).unwrap();
        assert_eq!(region.sheet, SheetId::Regular(3));
        assert_eq!(region.row, 0);

        // Row 57 is the last row of the second pair (57 - 25 = 32).
        let region = resolve(57 * 21).unwrap();
        assert_eq!(region.sheet, SheetId::Regular(3));
        assert_eq!(region.row, 32);

        let region = resolve(58 * 21).unwrap();
        assert_eq!(region.sheet, SheetId::Regular(5));
        assert_eq!(region.row, 0);
    }

    #[test]
    fn test_compounding_split_reaches_sixth_index() {
        // Right-hand columns below row 57 compound all three adjustments.
        let region = resolve(58 * 21 + 11).unwrap();
        assert_eq!(region.sheet, SheetId::Regular(6));
        assert_eq!((region.column, region.row), (0, 0));
    }

    #[test]
    fn test_regular_range_properties() {
        for icon in 0..EGG_START {
            let region = resolve(icon).unwrap();
            let n = icon as u64;
            assert_eq!(region.grid_column, n % 21, "icon {}", icon);
            assert_eq!(region.grid_row, n / 21, "icon {}", icon);

            let index = match region.sheet {
                SheetId::Regular(index) => index,
                SheetId::Egg => panic!("icon {} resolved to egg", icon),
            };
            assert!((1..=6).contains(&index), "icon {} on sheet {}", icon, index);
            assert!(region.sheet.grid().contains(region.column, region.row), "icon {}", icon);
            assert_eq!(region.normal.x, region.column * 80);
            assert_eq!(region.normal.y, region.row * 30);
            assert_eq!(region.shiny.unwrap().x, region.column * 80 + 40);
        }
    }

    #[test]
    fn test_regular_sheet_index_matches_boundary_table() {
        for icon in 0..EGG_START {
            let region = resolve(icon).unwrap();
            let right = region.grid_column > 10;
            let pair = match region.grid_row {
                0..=24 => 1,
                25..=57 => 3,
                _ => 5,
            };
            let expected = if right { pair + 1 } else { pair };
            assert_eq!(region.sheet, SheetId::Regular(expected), "icon {}", icon);
        }
    }

    #[test]
    fn test_resolve_first_egg() {
        let region = resolve(1451).unwrap();
        assert_eq!(region.sheet, SheetId::Egg);
        assert_eq!((region.column, region.row), (0, 0));
        assert_eq!(region.normal, RectPx::new(0, 0, 30, 32));
        assert!(region.shiny.is_none());
    }

    #[test]
    fn test_resolve_egg_variant_b() {
        let region = resolve(1873).unwrap();
        // base = 1873 - 1442 = 431
        assert_eq!((region.column, region.row), (17, 23));
        assert_eq!(region.normal, RectPx::new(17 * 30, 23 * 32, 30, 32));
    }

    #[test]
    fn test_egg_variant_boundary() {
        // 1872 still uses the first offset, so its base is 421.
        let last_a = resolve(1872).unwrap();
        assert_eq!((last_a.column, last_a.row), (421 % 18, 421 / 18));
    }

    #[test]
    fn test_egg_range_properties() {
        for icon in EGG_START..2400 {
            let region = resolve(icon).unwrap();
            let base = (if icon >= 1873 { icon - 1442 } else { icon - 1451 }) as u64;
            assert_eq!(region.column, base % 18, "icon {}", icon);
            assert_eq!(region.row, base / 18, "icon {}", icon);
            assert!(region.sheet.grid().contains(region.column, region.row));
        }
    }

    #[test]
    fn test_negative_is_out_of_domain() {
        assert_eq!(resolve(-1), Err(ResolveError::OutOfDomain(-1)));
        let table = CustomIconTable::new();
        let sheets = SheetsConfig::default();
        assert_eq!(
            resolve_icon(-5, false, Lookup::Custom, &table, &sheets),
            Err(ResolveError::OutOfDomain(-5))
        );
    }

    #[test]
    fn test_split_sheet_order() {
        assert_eq!(split_sheet(10, 24), (1, 10, 24));
        assert_eq!(split_sheet(11, 25), (4, 0, 0));
        assert_eq!(split_sheet(20, 69), (6, 9, 11));
    }

    #[test]
    fn test_resolve_icon_geometric() {
        let table = CustomIconTable::new();
        let sheets = SheetsConfig::default();

        let normal = resolve_icon(151, false, Lookup::Geometric, &table, &sheets).unwrap();
        assert_eq!(
            normal,
            AssetReference::Sheet {
                asset_id: "17134745575".to_string(),
                sheet: SheetId::Regular(1),
                rect: RectPx::new(320, 210, 40, 30),
            }
        );
        assert_eq!(normal.uri("rbxassetid://"), "rbxassetid://17134745575");

        let shiny = resolve_icon(151, true, Lookup::Geometric, &table, &sheets).unwrap();
        assert!(matches!(shiny, AssetReference::Sheet { rect, .. } if rect.x == 360));
    }

    #[test]
    fn test_resolve_icon_egg_ignores_shiny() {
        let table = CustomIconTable::new();
        let sheets = SheetsConfig::default();
        let egg = resolve_icon(1451, true, Lookup::Geometric, &table, &sheets).unwrap();
        assert_eq!(egg.asset_id(), "13039987315");
        assert!(matches!(egg, AssetReference::Sheet { rect, .. } if rect == RectPx::new(0, 0, 30, 32)));
    }

    #[test]
    fn test_resolve_icon_unassigned_sheet_not_found() {
        let table = CustomIconTable::new();
        let sheets = SheetsConfig::default();
        let icon = 58 * 21 + 11;
        assert_eq!(
            resolve_icon(icon, false, Lookup::Geometric, &table, &sheets),
            Err(ResolveError::NotFound(icon))
        );
    }

    #[test]
    fn test_resolve_icon_custom_uses_slot_offset() {
        let mut table = CustomIconTable::new();
        table.put(entry(1186, "A", Some("B"), "Celebi")).unwrap();
        let sheets = SheetsConfig::default();

        let normal = resolve_icon(1185, false, Lookup::Custom, &table, &sheets).unwrap();
        assert_eq!(
            normal,
            AssetReference::Custom {
                asset_id: "A".to_string(),
                slot: 1186,
                label: "Celebi".to_string()
            }
        );
        let shiny = resolve_icon(1185, true, Lookup::Custom, &table, &sheets).unwrap();
        assert_eq!(shiny.asset_id(), "B");

        // The geometric path ignores the table.
        let geometric = resolve_icon(1185, false, Lookup::Geometric, &table, &sheets).unwrap();
        assert!(matches!(geometric, AssetReference::Sheet { .. }));
    }

    #[test]
    fn test_resolve_icon_custom_falls_through() {
        let mut table = CustomIconTable::new();
        table.put(entry(1200, "N", None, "No shiny")).unwrap();
        let sheets = SheetsConfig::default();

        let missing = resolve_icon(1185, false, Lookup::Custom, &table, &sheets).unwrap();
        assert!(matches!(missing, AssetReference::Sheet { .. }));

        let no_shiny = resolve_icon(1199, true, Lookup::Custom, &table, &sheets).unwrap();
        assert!(matches!(no_shiny, AssetReference::Sheet { .. }));

        let normal = resolve_icon(1199, false, Lookup::Custom, &table, &sheets).unwrap();
        assert_eq!(normal.asset_id(), "N");
    }

    #[test]
    fn test_positions_range() {
        let sheets = SheetsConfig::default();
        let rows = positions(150..=152, &sheets).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].icon_number, 151);
        assert_eq!(rows[1].x_normal, 320);
        assert_eq!(rows[1].x_shiny, Some(360));
        assert_eq!(rows[1].asset_id, "17134745575");

        let eggs = positions(1451..=1451, &sheets).unwrap();
        assert_eq!(eggs[0].kind, "egg");
        assert_eq!(eggs[0].x_shiny, None);

        assert!(positions(-1..=1, &sheets).is_err());
    }
}
