pub mod table_display;

pub use table_display::{StrValue, comfy_table, make_comfy_table, make_schema_vertical_table};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_table_through_crate_root() {
        let table: comfy_table::Table = make_schema_vertical_table(
            [("a".to_string(), "Int64".to_string())].into_iter(),
        );
        let rendered = table.to_string();
        assert!(rendered.contains("column_name"));
        assert!(rendered.contains("Int64"));
    }
}
