//! Dataset registry: the fixed set of named tabular resources.
//!
//! Each dataset is either inline CSV text or a remote CSV name, plus a
//! display title. The registry
//! is immutable and defined at process start; resolution is a pure lookup.

use crate::error::{RegistryError, RegistryResult};

/// Where a dataset's CSV content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSource {
    /// CSV text embedded in the registry. No I/O needed.
    Inline(&'static str),
    /// Remote CSV resource, fetched at load time. Relative names are
    /// resolved against the configured base URL.
    Remote(&'static str),
}

/// A named, fixed tabular resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetDescriptor {
    /// Short identifier used in the selection parameter.
    pub id: &'static str,
    /// Display title, shown as the report header and used for the
    /// export filename.
    pub title: &'static str,
    /// CSV source.
    pub source: DatasetSource,
}

/// Dataset id whose chart slots get the sales-specific column heuristics.
pub const SALES_DATASET_ID: &str = "vendas";

const DATASETS: &[DatasetDescriptor] = &[
    DatasetDescriptor {
        id: "vendas",
        title: "Relatório de Vendas - Dados de Teste",
        source: DatasetSource::Remote("dadosteste.csv"),
    },
    DatasetDescriptor {
        id: "estoque",
        title: "Inventário de Estoque",
        source: DatasetSource::Inline(
            "Produto,Quantidade,PrecoUnitario,Status\n\
             Monitor 27',150,1200,Disponível\n\
             Mouse Gamer,450,85,Baixo\n\
             Teclado Mecânico,210,350,Disponível\n\
             Webcam HD,50,450,Esgotado\n\
             Headset Pro,320,150,Disponível",
        ),
    },
    DatasetDescriptor {
        id: "clientes",
        title: "Base de Clientes (Top 5)",
        source: DatasetSource::Inline(
            "Cliente,TotalComprado,CadastradoEm,Local\n\
             Alfa Ltda,52000,2021,SP\n\
             Beta S.A.,35000,2022,RJ\n\
             Gama Tech,18000,2023,MG\n\
             Delta Com,9500,2024,PR\n\
             Epsilon Eireli,1200,2024,SC",
        ),
    },
    DatasetDescriptor {
        id: "marketing",
        title: "Desempenho de Marketing (Cliques)",
        source: DatasetSource::Inline(
            "Campanha,Cliques,Custo,Conversoes\n\
             Google Ads Q1,5500,3200,120\n\
             Facebook Ads Q1,7800,2500,95\n\
             SEO Orgânico,12000,0,250\n\
             Email Mkt,4500,150,60",
        ),
    },
];

/// All registered datasets, in registry order.
pub fn all() -> &'static [DatasetDescriptor] {
    DATASETS
}

/// Resolve a selection parameter into a dataset descriptor.
///
/// An absent parameter and an unknown id are distinct failures: both
/// surface a user-visible message, but callers must be able to tell
/// them apart.
pub fn resolve(param: Option<&str>) -> RegistryResult<&'static DatasetDescriptor> {
    let id = param.ok_or(RegistryError::NotSelected)?;
    DATASETS
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })
}
