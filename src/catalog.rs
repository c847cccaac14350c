use std::io;
use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools as _;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::procedure::{ProcedureDefinition, ProcedureError, ProcedureResult, ProcedureType};
use crate::waypoint::FromFixDescriptor;

use super::read_to_string;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read airport file: {0}")]
    FileRead(#[from] io::Error),
    #[error("failed to deserialize airport file: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("procedure {icao}: {source}")]
    Procedure {
        icao: String,
        source: ProcedureError,
    },
}

pub type CatalogResult = Result<ProcedureCatalog, CatalogError>;

#[derive(Deserialize)]
struct AirportProcedures {
    #[serde(default)]
    sids: IndexMap<String, Option<serde_json::Value>>,
    #[serde(default)]
    stars: IndexMap<String, Option<serde_json::Value>>,
}

/// All SIDs and STARs of one airport, keyed by procedure identifier.
#[derive(Clone, Debug, Default)]
pub struct ProcedureCatalog {
    sids: IndexMap<String, ProcedureDefinition>,
    stars: IndexMap<String, ProcedureDefinition>,
}

fn build_procedures(
    procedure_type: ProcedureType,
    raw: IndexMap<String, Option<serde_json::Value>>,
) -> Result<IndexMap<String, ProcedureDefinition>, CatalogError> {
    raw.into_iter()
        .map(|(icao, data)| {
            match ProcedureDefinition::from_typed_value(procedure_type, data) {
                Ok(procedure) => Ok((icao, procedure)),
                Err(source) => Err(CatalogError::Procedure { icao, source }),
            }
        })
        .collect()
}

impl ProcedureCatalog {
    pub fn from_json(content: &[u8]) -> CatalogResult {
        let unparsed_file = read_to_string(content)?;
        let airport: AirportProcedures = serde_json::from_str(&unparsed_file)?;

        let catalog = Self {
            sids: build_procedures(ProcedureType::Sid, airport.sids)?,
            stars: build_procedures(ProcedureType::Star, airport.stars)?,
        };
        for icao in catalog.stars.keys().filter(|icao| catalog.sids.contains_key(*icao)) {
            warn!("{icao} is both a SID and a STAR, get() resolves the SID");
        }
        debug!(
            "loaded {} SIDs and {} STARs",
            catalog.sids.len(),
            catalog.stars.len()
        );

        Ok(catalog)
    }

    pub fn from_path(path: &Path) -> CatalogResult {
        Self::from_json(&fs_err::read(path)?)
    }

    pub fn get(&self, icao: &str) -> Option<&ProcedureDefinition> {
        self.sid(icao).or_else(|| self.star(icao))
    }

    pub fn sid(&self, icao: &str) -> Option<&ProcedureDefinition> {
        self.sids.get(icao)
    }

    pub fn star(&self, icao: &str) -> Option<&ProcedureDefinition> {
        self.stars.get(icao)
    }

    pub fn sids(&self) -> impl Iterator<Item = &ProcedureDefinition> {
        self.sids.values()
    }

    pub fn stars(&self) -> impl Iterator<Item = &ProcedureDefinition> {
        self.stars.values()
    }

    pub fn len(&self) -> usize {
        self.sids.len() + self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sids.is_empty() && self.stars.is_empty()
    }

    fn find(&self, icao: &str) -> ProcedureResult<&ProcedureDefinition> {
        self.get(icao)
            .ok_or_else(|| ProcedureError::UnknownProcedure(icao.to_string()))
    }

    pub fn waypoints_for<W: FromFixDescriptor>(
        &self,
        icao: &str,
        entry: &str,
        exit: &str,
    ) -> ProcedureResult<Vec<W>> {
        self.find(icao)
            .inspect_err(|e| warn!("{e}"))?
            .waypoints_for_entry_and_exit(entry, exit)
    }

    pub fn random_exit_point(
        &self,
        icao: &str,
        rng: &mut impl rand::Rng,
    ) -> ProcedureResult<&str> {
        self.find(icao)?.random_exit_point_with(rng)
    }

    /// Fix names of every procedure, SIDs first, first occurrence first.
    pub fn all_fix_names_in_use(&self) -> ProcedureResult<Vec<String>> {
        let names = self
            .sids()
            .chain(self.stars())
            .map(ProcedureDefinition::all_fix_names_in_use)
            .collect::<ProcedureResult<Vec<_>>>()?;

        Ok(names.into_iter().flatten().unique().collect())
    }

    /// Fix names in use that the airport's fix database cannot resolve.
    pub fn unknown_fix_names(
        &self,
        is_known: impl Fn(&str) -> bool,
    ) -> ProcedureResult<Vec<String>> {
        let unknown = self
            .all_fix_names_in_use()?
            .into_iter()
            .filter(|name| !is_known(name.as_str()))
            .collect::<Vec<_>>();
        for name in &unknown {
            warn!("fix {name} is used by a procedure but not defined");
        }

        Ok(unknown)
    }

    /// Airport unload.
    pub fn reset(&mut self) {
        self.sids
            .values_mut()
            .chain(self.stars.values_mut())
            .for_each(ProcedureDefinition::reset);
        self.sids.clear();
        self.stars.clear();
    }
}
