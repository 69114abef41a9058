//! Generic searchable/paginated/exportable table model.
//!
//! Fully generic over the row shape: callers describe columns as
//! header + accessor pairs and the view handles filtering, paging, and the
//! export hand-off. Rows are expected to carry a stable unique id; the view
//! itself never inspects one.

use crate::export::{ExportError, ExportSink};

/// A column descriptor: header label plus a stringifying accessor.
pub struct Column<T> {
    header: String,
    accessor: Box<dyn Fn(&T) -> String + Send + Sync>,
}

impl<T> Column<T> {
    pub fn new(
        header: impl Into<String>,
        accessor: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            header: header.into(),
            accessor: Box::new(accessor),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn render(&self, row: &T) -> String {
        (self.accessor)(row)
    }
}

/// View options.
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    pub searchable: bool,
    pub paginated: bool,
    pub page_size: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            searchable: true,
            paginated: true,
            page_size: 10,
        }
    }
}

/// A lazily filtered, paginated view over a row collection.
pub struct TableView<T> {
    rows: Vec<T>,
    columns: Vec<Column<T>>,
    options: TableOptions,
    query: String,
    page: usize,
}

impl<T: Clone> TableView<T> {
    pub fn new(rows: Vec<T>, columns: Vec<Column<T>>, options: TableOptions) -> Self {
        Self {
            rows,
            columns,
            options,
            query: String::new(),
            page: 1,
        }
    }

    /// Replace the search query. Resets to page 1 on every change.
    ///
    /// Matching is a case-insensitive substring test against the stringified
    /// value of **any** column; an empty query matches everything.
    pub fn set_query(&mut self, query: impl Into<String>) {
        if !self.options.searchable {
            return;
        }
        self.query = query.into();
        self.page = 1;
    }

    fn filtered(&self) -> Vec<&T> {
        if self.query.is_empty() {
            return self.rows.iter().collect();
        }

        let needle = self.query.to_lowercase();
        self.rows
            .iter()
            .filter(|row| {
                self.columns
                    .iter()
                    .any(|col| col.render(row).to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().len()
    }

    /// Number of pages for the current filter; never less than 1.
    pub fn page_count(&self) -> usize {
        if !self.options.paginated {
            return 1;
        }
        self.filtered_count().div_ceil(self.options.page_size).max(1)
    }

    /// Jump to a page. Out-of-range requests clamp, they never error.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count());
    }

    pub fn page(&self) -> usize {
        self.page.min(self.page_count())
    }

    /// The rows visible on the current page.
    pub fn current_page(&self) -> Vec<T> {
        let filtered = self.filtered();
        if !self.options.paginated {
            return filtered.into_iter().cloned().collect();
        }

        let start = (self.page() - 1) * self.options.page_size;
        filtered
            .into_iter()
            .skip(start)
            .take(self.options.page_size)
            .cloned()
            .collect()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.header().to_string()).collect()
    }

    /// Hand the **full filtered set** (not just the current page) to a sink.
    pub fn export_to(
        &self,
        sink: &dyn ExportSink,
        title: Option<&str>,
    ) -> Result<Vec<u8>, ExportError> {
        let headers = self.headers();
        let rows: Vec<Vec<String>> = self
            .filtered()
            .into_iter()
            .map(|row| self.columns.iter().map(|col| col.render(row)).collect())
            .collect();
        sink.export(title, &headers, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        id: u32,
        name: String,
    }

    fn row(id: u32, name: &str) -> Row {
        Row {
            id,
            name: name.to_string(),
        }
    }

    fn columns() -> Vec<Column<Row>> {
        vec![
            Column::new("Id", |r: &Row| r.id.to_string()),
            Column::new("Name", |r: &Row| r.name.clone()),
        ]
    }

    fn medications_view() -> TableView<Row> {
        TableView::new(
            vec![row(1, "Paracetamol"), row(2, "Ibuprofen")],
            columns(),
            TableOptions::default(),
        )
    }

    #[test]
    fn search_is_case_insensitive_substring_over_any_column() {
        let mut view = medications_view();

        view.set_query("para");
        assert_eq!(view.current_page(), vec![row(1, "Paracetamol")]);

        view.set_query("2");
        assert_eq!(view.current_page(), vec![row(2, "Ibuprofen")]);
    }

    #[test]
    fn empty_query_returns_all_rows() {
        let mut view = medications_view();
        view.set_query("para");
        view.set_query("");
        assert_eq!(view.current_page().len(), 2);
    }

    #[test]
    fn query_change_resets_to_page_one() {
        let rows: Vec<Row> = (1..=25).map(|i| row(i, &format!("Med {i}"))).collect();
        let mut view = TableView::new(rows, columns(), TableOptions::default());

        view.go_to_page(3);
        assert_eq!(view.page(), 3);

        view.set_query("Med");
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn twenty_five_rows_make_three_pages_and_page_four_clamps() {
        let rows: Vec<Row> = (1..=25).map(|i| row(i, &format!("Med {i}"))).collect();
        let mut view = TableView::new(rows, columns(), TableOptions::default());

        assert_eq!(view.page_count(), 3);

        view.go_to_page(4);
        assert_eq!(view.page(), 3);
        assert_eq!(view.current_page().len(), 5);

        view.go_to_page(0);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn empty_collection_still_has_one_page() {
        let view = TableView::new(Vec::<Row>::new(), columns(), TableOptions::default());
        assert_eq!(view.page_count(), 1);
        assert!(view.current_page().is_empty());
    }

    #[test]
    fn export_receives_the_full_filtered_set_not_the_current_page() {
        struct Recorder(std::sync::Mutex<Vec<Vec<String>>>);

        impl ExportSink for Recorder {
            fn export(
                &self,
                _title: Option<&str>,
                _headers: &[String],
                rows: &[Vec<String>],
            ) -> Result<Vec<u8>, ExportError> {
                *self.0.lock().unwrap() = rows.to_vec();
                Ok(Vec::new())
            }
        }

        let rows: Vec<Row> = (1..=25).map(|i| row(i, &format!("Med {i}"))).collect();
        let mut view = TableView::new(rows, columns(), TableOptions::default());
        view.go_to_page(2);

        let recorder = Recorder(std::sync::Mutex::new(Vec::new()));
        view.export_to(&recorder, Some("Medication List")).unwrap();

        assert_eq!(recorder.0.lock().unwrap().len(), 25);
    }
}
