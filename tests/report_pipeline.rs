//! End-to-end pipeline tests over the inline datasets: load, search, sort
//! and chart building through the public page API.

use relatorio::table::{SortDirection, ViewState};
use relatorio::{Config, HeadlessChartRenderer, ReportPage, Slot};

async fn loaded(base: &str) -> ReportPage<HeadlessChartRenderer> {
    let mut page = ReportPage::new(Config::default(), HeadlessChartRenderer);
    page.load(Some(base)).await.unwrap();
    page
}

#[tokio::test]
async fn test_estoque_full_interaction_flow() {
    let mut page = loaded("estoque").await;
    assert_eq!(page.header(), "Inventário de Estoque");

    // Search narrows to the three "Disponível" rows.
    let model = page.set_search_term("disponível").unwrap();
    assert_eq!(model.state, ViewState::Populated);
    assert_eq!(model.rows.len(), 3);

    // Sorting applies to the filtered rows only.
    let model = page.toggle_sort("Quantidade").unwrap();
    let quantities: Vec<&str> = model.rows.iter().map(|r| r[1].as_str()).collect();
    assert_eq!(quantities, vec!["150", "210", "320"]);
    assert_eq!(model.headers[1].sort, Some(SortDirection::Ascending));

    // Clearing the search keeps the sort key.
    let model = page.set_search_term("").unwrap();
    assert_eq!(model.rows.len(), 5);
    let quantities: Vec<&str> = model.rows.iter().map(|r| r[1].as_str()).collect();
    assert_eq!(quantities, vec!["50", "150", "210", "320", "450"]);
}

#[tokio::test]
async fn test_search_without_matches_reports_no_results() {
    let mut page = loaded("clientes").await;
    let model = page.set_search_term("inexistente").unwrap();
    assert_eq!(model.state, ViewState::NoResults);
    assert_eq!(model.message(), Some("Nenhum resultado encontrado para a busca."));
    // Headers stay rendered so the table shell survives the empty body.
    assert_eq!(model.headers.len(), 4);
}

#[tokio::test]
async fn test_estoque_chart_columns_fall_back_to_positions() {
    let page = loaded("estoque").await;

    let primary = page.charts().get(Slot::Primary).unwrap().spec();
    assert_eq!(primary.series.label_column, "Produto");
    assert_eq!(primary.series.value_column, "Quantidade");

    let secondary = page.charts().get(Slot::Secondary).unwrap().spec();
    assert_eq!(secondary.series.label_column, "Produto");
    assert_eq!(secondary.series.value_column, "PrecoUnitario");
}

#[tokio::test]
async fn test_marketing_charts_aggregate_all_campaigns() {
    let page = loaded("marketing").await;

    let primary = page.charts().get(Slot::Primary).unwrap().spec();
    assert_eq!(primary.series.categories.len(), 4);
    assert_eq!(primary.series.totals.iter().sum::<f64>(), 29800.0);
    assert_eq!(primary.title, "Visualização Agregada: Cliques por Campanha");

    let secondary = page.charts().get(Slot::Secondary).unwrap().spec();
    assert_eq!(secondary.series.value_column, "Custo");
    assert!(secondary.show_legend);
}

#[tokio::test]
async fn test_switching_dataset_rebuilds_charts() {
    let mut page = loaded("estoque").await;
    page.load(Some("clientes")).await.unwrap();

    assert_eq!(page.header(), "Base de Clientes (Top 5)");
    let primary = page.charts().get(Slot::Primary).unwrap().spec();
    assert_eq!(primary.series.label_column, "Cliente");
    assert_eq!(primary.series.value_column, "TotalComprado");
}

#[tokio::test]
async fn test_failed_load_after_success_clears_previous_state() {
    let mut page = loaded("estoque").await;
    assert!(page.render().is_some());

    // The remote dataset cannot resolve without a base URL.
    assert!(page.load(Some("vendas")).await.is_err());
    assert!(page.render().is_none(), "stale table discarded");
    assert!(page.charts().is_empty(), "stale charts discarded");
    assert_eq!(
        page.table_message(),
        Some("Erro: Falha ao carregar o arquivo CSV externo. (Verifique o nome do arquivo)")
    );
}
