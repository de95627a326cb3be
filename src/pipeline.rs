//! Report page orchestration.
//!
//! Ties the stages together for one page load:
//! resolve the selection parameter, ingest the CSV, seed the table view,
//! and rebuild both chart slots from the same row set. User interactions
//! (search, sort) re-drive the table view only; a fresh load recomputes
//! everything and resets sort/search state.
//!
//! Ingestion-stage failures halt the pipeline for that load and leave a
//! single explanatory message in place of the table; nothing here is fatal
//! and the page stays interactive.

use tracing::info;

use crate::chart::{ChartRegistry, ChartRenderer, Slot};
use crate::config::Config;
use crate::error::{IngestError, RegistryError, ReportResult};
use crate::ingest;
use crate::registry::{self, DatasetDescriptor};
use crate::table::{TableView, TableViewModel};

/// Header message when no dataset identifier was supplied.
pub const MSG_NOT_SELECTED: &str = "Selecione uma base no Dashboard Principal!";

/// Header message when the identifier is unknown.
pub const MSG_NOT_FOUND: &str = "Base de Dados Não Encontrada!";

/// Table message when the remote CSV could not be fetched.
pub const MSG_SOURCE_UNAVAILABLE: &str =
    "Erro: Falha ao carregar o arquivo CSV externo. (Verifique o nome do arquivo)";

/// Table message when the CSV body is structurally invalid.
pub const MSG_MALFORMED: &str = "Erro: O CSV está em um formato inválido.";

/// One report page: current dataset, table view and chart instances.
pub struct ReportPage<R: ChartRenderer> {
    config: Config,
    charts: ChartRegistry<R>,
    table: Option<TableView>,
    dataset: Option<&'static DatasetDescriptor>,
    header: String,
    table_message: Option<&'static str>,
}

impl<R: ChartRenderer> ReportPage<R> {
    pub fn new(config: Config, renderer: R) -> Self {
        Self {
            config,
            charts: ChartRegistry::new(renderer),
            table: None,
            dataset: None,
            header: String::new(),
            table_message: None,
        }
    }

    /// Load the dataset selected by `param` (the page's query value).
    ///
    /// On failure the page state carries the user-visible message and the
    /// error is also returned for callers that want to inspect it.
    pub async fn load(&mut self, param: Option<&str>) -> ReportResult<()> {
        // A fresh load discards everything from the previous one.
        self.table = None;
        self.table_message = None;
        self.dataset = None;
        self.charts.clear();

        let descriptor = match registry::resolve(param) {
            Ok(d) => d,
            Err(e) => {
                self.header = match &e {
                    RegistryError::NotSelected => MSG_NOT_SELECTED.to_string(),
                    RegistryError::NotFound { .. } => MSG_NOT_FOUND.to_string(),
                };
                return Err(e.into());
            }
        };

        self.header = descriptor.title.to_string();
        self.dataset = Some(descriptor);

        let rows = match ingest::ingest(descriptor, &self.config).await {
            Ok(rows) => rows,
            Err(e) => {
                self.table_message = Some(match &e {
                    IngestError::SourceUnavailable { .. } => MSG_SOURCE_UNAVAILABLE,
                    IngestError::MalformedContent { .. } => MSG_MALFORMED,
                });
                return Err(e.into());
            }
        };

        info!(dataset = descriptor.id, rows = rows.len(), "report loaded");
        self.charts.rebuild(&rows, descriptor.id);
        self.table = Some(TableView::new(rows));
        Ok(())
    }

    /// Report header: the dataset title, or the selection error message.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The single explanatory row replacing the table after a failed load.
    pub fn table_message(&self) -> Option<&'static str> {
        self.table_message
    }

    /// Currently loaded dataset, if any.
    pub fn dataset(&self) -> Option<&'static DatasetDescriptor> {
        self.dataset
    }

    /// The table view engine, once a load has succeeded.
    pub fn table(&self) -> Option<&TableView> {
        self.table.as_ref()
    }

    /// Set the search term and return the re-rendered view.
    pub fn set_search_term(&mut self, term: &str) -> Option<TableViewModel> {
        let table = self.table.as_mut()?;
        table.set_search_term(term);
        Some(table.render())
    }

    /// Toggle sorting on a column and return the re-rendered view.
    pub fn toggle_sort(&mut self, column: &str) -> Option<TableViewModel> {
        let table = self.table.as_mut()?;
        table.toggle_sort(column);
        Some(table.render())
    }

    /// Render the current view without changing any state.
    pub fn render(&self) -> Option<TableViewModel> {
        self.table.as_ref().map(TableView::render)
    }

    pub fn charts(&self) -> &ChartRegistry<R> {
        &self.charts
    }

    pub fn charts_mut(&mut self) -> &mut ChartRegistry<R> {
        &mut self.charts
    }

    /// Slots currently holding a chart instance.
    pub fn rendered_slots(&self) -> Vec<Slot> {
        self.charts.rendered_slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartInstance, ChartSpec};
    use crate::error::ReportError;

    /// Minimal renderer for pipeline tests.
    struct NullRenderer;

    struct NullChart {
        responsive: bool,
        shadow: String,
    }

    impl ChartInstance for NullChart {
        fn destroy(&mut self) {}
        fn resize(&mut self) {}
        fn responsive(&self) -> bool {
            self.responsive
        }
        fn set_responsive(&mut self, on: bool) {
            self.responsive = on;
        }
        fn shadow(&self) -> String {
            self.shadow.clone()
        }
        fn set_shadow(&mut self, style: &str) {
            self.shadow = style.to_string();
        }
    }

    impl ChartRenderer for NullRenderer {
        type Chart = NullChart;

        fn create(&mut self, _spec: &ChartSpec) -> NullChart {
            NullChart { responsive: true, shadow: String::new() }
        }
    }

    #[tokio::test]
    async fn test_load_without_param_sets_message_and_skips_fetch() {
        let mut page = ReportPage::new(Config::default(), NullRenderer);
        let err = page.load(None).await.unwrap_err();
        assert!(matches!(err, ReportError::Registry(RegistryError::NotSelected)));
        assert_eq!(page.header(), MSG_NOT_SELECTED);
        assert!(page.table().is_none(), "table area untouched");
        assert!(page.charts().is_empty());
    }

    #[tokio::test]
    async fn test_load_unknown_id() {
        let mut page = ReportPage::new(Config::default(), NullRenderer);
        let err = page.load(Some("rh")).await.unwrap_err();
        assert!(matches!(
            err,
            ReportError::Registry(RegistryError::NotFound { .. })
        ));
        assert_eq!(page.header(), MSG_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_load_estoque_builds_table_and_charts() {
        let mut page = ReportPage::new(Config::default(), NullRenderer);
        page.load(Some("estoque")).await.unwrap();

        assert_eq!(page.header(), "Inventário de Estoque");
        let model = page.render().unwrap();
        assert_eq!(model.headers.len(), 4);
        assert_eq!(model.rows.len(), 5);
        assert_eq!(page.rendered_slots(), vec![Slot::Primary, Slot::Secondary]);
    }

    #[tokio::test]
    async fn test_remote_without_base_url_reports_source_unavailable() {
        let mut page = ReportPage::new(Config::default(), NullRenderer);
        let err = page.load(Some("vendas")).await.unwrap_err();
        assert!(matches!(
            err,
            ReportError::Ingest(IngestError::SourceUnavailable { .. })
        ));
        assert_eq!(page.table_message(), Some(MSG_SOURCE_UNAVAILABLE));
        // Title was resolved before the fetch failed.
        assert_eq!(page.header(), "Relatório de Vendas - Dados de Teste");
    }

    #[tokio::test]
    async fn test_reload_resets_search_and_sort() {
        let mut page = ReportPage::new(Config::default(), NullRenderer);
        page.load(Some("estoque")).await.unwrap();
        page.set_search_term("esgotado").unwrap();
        page.toggle_sort("Quantidade").unwrap();

        page.load(Some("estoque")).await.unwrap();
        let table = page.table().unwrap();
        assert_eq!(table.search_term(), "");
        assert_eq!(table.sort_state().column, None);
    }
}
