pub use comfy_table;

const DEFAULT_WIDTH_IF_NO_TTY: u16 = 120;
const EXPECTED_COL_WIDTH: usize = 18;
const DOTS: &str = "…";

/// Environment variable that disables bold headers, e.g. for snapshot-style tests.
pub const PLAIN_TABLE_HEADERS_IN_DISPLAY: &str = "DDF_PLAIN_TABLE_HEADERS";

pub trait StrValue {
    fn str_value(&self, idx: usize) -> String;
}

fn plain_headers() -> bool {
    std::env::var_os(PLAIN_TABLE_HEADERS_IN_DISPLAY).is_some()
}

fn maybe_apply_width(table: &mut comfy_table::Table) {
    if plain_headers() {
        table.force_no_tty();
    }
    if table.width().is_none() && !table.is_tty() {
        table.set_width(DEFAULT_WIDTH_IF_NO_TTY);
    }
}

fn create_table_cell(value: &str) -> comfy_table::Cell {
    let mut cell = comfy_table::Cell::new(value);
    if !plain_headers() {
        cell = cell.add_attribute(comfy_table::Attribute::Bold);
    }
    cell
}

fn new_table() -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    maybe_apply_width(&mut table);
    table
}

pub fn make_schema_vertical_table(
    fields: impl Iterator<Item = (String, String)>,
) -> comfy_table::Table {
    let mut table = new_table();
    table.set_header(vec![create_table_cell("column_name"), create_table_cell("type")]);
    for (name, dtype) in fields {
        table.add_row(vec![name, dtype]);
    }
    table
}

fn truncate(value: String, max_width: Option<usize>) -> String {
    match max_width {
        Some(max_width) if value.chars().count() > max_width.saturating_sub(1) => {
            let kept = value
                .chars()
                .take(max_width.saturating_sub(1))
                .collect::<String>();
            format!("{kept}{DOTS}")
        }
        _ => value,
    }
}

/// Renders columns as a comfy table, hiding the middle columns when the terminal is too narrow.
///
/// `fields` are the header labels, `columns` the cell sources and `num_rows` how many rows of
/// each column to render.
pub fn make_comfy_table<S: AsRef<str>>(
    fields: &[S],
    columns: Option<&[&dyn StrValue]>,
    num_rows: Option<usize>,
    max_col_width: Option<usize>,
) -> comfy_table::Table {
    let mut table = new_table();

    let num_columns = fields.len();
    let terminal_width = table.width().unwrap_or(DEFAULT_WIDTH_IF_NO_TTY) as usize;
    let max_cols = (terminal_width.div_ceil(EXPECTED_COL_WIDTH) - 1).max(1);
    let (head_cols, tail_cols) = if num_columns > max_cols {
        (max_cols.div_ceil(2), max_cols / 2)
    } else {
        (num_columns, 0)
    };

    let mut header = fields
        .iter()
        .take(head_cols)
        .map(|field| create_table_cell(field.as_ref()))
        .collect::<Vec<_>>();
    if tail_cols > 0 {
        let unseen_cols = num_columns - (head_cols + tail_cols);
        header.push(
            create_table_cell(&format!("{DOTS}\n\n({unseen_cols} hidden)"))
                .set_alignment(comfy_table::CellAlignment::Center),
        );
        header.extend(
            fields
                .iter()
                .skip(num_columns - tail_cols)
                .map(|field| create_table_cell(field.as_ref())),
        );
    }

    let columns = match columns {
        Some(columns) if !columns.is_empty() => columns,
        _ => {
            table.add_row(header);
            return table;
        }
    };

    table.set_header(header);
    for i in 0..num_rows.unwrap_or(0) {
        let cells = columns
            .iter()
            .map(|s| truncate(s.str_value(i), max_col_width))
            .collect::<Vec<_>>();
        if tail_cols > 0 {
            let mut row = cells.iter().take(head_cols).cloned().collect::<Vec<_>>();
            row.push(DOTS.to_string());
            row.extend(cells.iter().skip(num_columns - tail_cols).cloned());
            table.add_row(row);
        } else {
            table.add_row(cells);
        }
    }
    table
}
