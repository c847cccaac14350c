use std::{fmt::Display, io, str::FromStr};

use bevy_reflect::Reflect;
use itertools::Itertools as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::descriptor::{deserialize_draw, DrawEntry, FixDescriptor, SegmentMap};
use crate::token::FixToken;
use crate::waypoint::FromFixDescriptor;

use super::read_to_string;

#[derive(Error, Debug)]
pub enum ProcedureError {
    #[error("missing procedure data")]
    MissingData,
    #[error("unknown procedure type: {0}")]
    UnknownType(String),
    #[error("failed to read procedure data: {0}")]
    FileRead(#[from] io::Error),
    #[error("failed to deserialize procedure data: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("{icao}: draw must be a list of fix segments")]
    MalformedDraw { icao: String },
    #[error("{icao}: {entry} is not a valid entry")]
    UnknownEntry { icao: String, entry: String },
    #[error("{icao}: {exit} is not a valid exit")]
    UnknownExit { icao: String, exit: String },
    #[error("{icao}: no exit points defined")]
    NoExitPoints { icao: String },
    #[error("unknown procedure: {0}")]
    UnknownProcedure(String),
}

impl ProcedureError {
    /// Lookup failures leave the procedure usable; the caller may retry with other keys.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::UnknownEntry { .. }
                | Self::UnknownExit { .. }
                | Self::NoExitPoints { .. }
                | Self::UnknownProcedure(_)
        )
    }
}

pub type ProcedureResult<T> = Result<T, ProcedureError>;

#[derive(Copy, Clone, Debug, Default, Reflect, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[reflect(Debug)]
pub enum ProcedureType {
    #[default]
    #[serde(rename = "SID")]
    Sid,
    #[serde(rename = "STAR")]
    Star,
}

impl FromStr for ProcedureType {
    type Err = ProcedureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SID" => Ok(Self::Sid),
            "STAR" => Ok(Self::Star),
            _ => Err(ProcedureError::UnknownType(s.to_string())),
        }
    }
}

impl Display for ProcedureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Sid => "SID",
            Self::Star => "STAR",
        })
    }
}

/// Procedure as found in airport data. `rwy` is the entry side of a SID and the
/// exit side of a STAR.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawProcedure {
    pub icao: String,
    pub name: String,
    #[serde(default)]
    pub body: Vec<FixDescriptor>,
    #[serde(default, deserialize_with = "deserialize_draw")]
    pub draw: Vec<DrawEntry>,
    #[serde(default)]
    pub rwy: SegmentMap,
    #[serde(default)]
    pub entry_points: SegmentMap,
    #[serde(default)]
    pub exit_points: SegmentMap,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ProcedureDefinition {
    icao: String,
    name: String,
    procedure_type: ProcedureType,
    body: Vec<FixDescriptor>,
    draw: Vec<DrawEntry>,
    entry_points: SegmentMap,
    exit_points: SegmentMap,
}

impl ProcedureDefinition {
    pub fn new(procedure_type: ProcedureType, raw: RawProcedure) -> Self {
        let (entry_points, exit_points) = match procedure_type {
            ProcedureType::Sid => (raw.rwy, raw.exit_points),
            ProcedureType::Star => (raw.entry_points, raw.rwy),
        };
        debug!(
            "{procedure_type} {}: {} entries, {} body fixes, {} exits",
            raw.icao,
            entry_points.len(),
            raw.body.len(),
            exit_points.len()
        );

        Self {
            icao: raw.icao,
            name: raw.name,
            procedure_type,
            body: raw.body,
            draw: raw.draw,
            entry_points,
            exit_points,
        }
    }

    /// Builds a procedure from an already decoded JSON tree, `None` standing for absent data.
    pub fn from_value(
        procedure_type: &str,
        data: Option<serde_json::Value>,
    ) -> ProcedureResult<Self> {
        let data = data
            .filter(|value| !value.is_null())
            .ok_or(ProcedureError::MissingData)?;

        Self::from_typed_value(procedure_type.parse()?, Some(data))
    }

    pub fn from_typed_value(
        procedure_type: ProcedureType,
        data: Option<serde_json::Value>,
    ) -> ProcedureResult<Self> {
        let raw = match data {
            None | Some(serde_json::Value::Null) => return Err(ProcedureError::MissingData),
            Some(value) => serde_json::from_value(value)?,
        };

        Ok(Self::new(procedure_type, raw))
    }

    pub fn from_json(procedure_type: &str, content: &[u8]) -> ProcedureResult<Self> {
        let unparsed_file = read_to_string(content)?;
        let raw = serde_json::from_str::<Option<RawProcedure>>(&unparsed_file)?
            .ok_or(ProcedureError::MissingData)?;

        Ok(Self::new(procedure_type.parse()?, raw))
    }

    /// Clears all data for airport teardown.
    pub fn reset(&mut self) {
        self.icao.clear();
        self.name.clear();
        self.body.clear();
        self.draw.clear();
        self.entry_points.clear();
        self.exit_points.clear();
    }

    pub fn icao(&self) -> &str {
        &self.icao
    }

    /// Spoken name, used for readbacks.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn procedure_type(&self) -> ProcedureType {
        self.procedure_type
    }

    pub fn body(&self) -> &[FixDescriptor] {
        &self.body
    }

    pub fn draw(&self) -> &[DrawEntry] {
        &self.draw
    }

    pub fn entry_points(&self) -> &SegmentMap {
        &self.entry_points
    }

    pub fn exit_points(&self) -> &SegmentMap {
        &self.exit_points
    }

    pub fn has_entry(&self, entry: &str) -> bool {
        self.entry_points.contains_key(entry)
    }

    pub fn has_exit(&self, exit: &str) -> bool {
        self.exit_points.contains_key(exit)
    }

    fn check_draw(&self) -> ProcedureResult<()> {
        if self.draw.first().is_some_and(DrawEntry::is_segment)
            && !self.draw.iter().any(DrawEntry::is_malformed)
        {
            Ok(())
        } else {
            Err(ProcedureError::MalformedDraw {
                icao: self.icao.clone(),
            })
        }
    }

    /// Draw polylines with their depiction markers decoded.
    pub fn draw_segments(&self) -> ProcedureResult<Vec<Vec<FixToken>>> {
        self.check_draw()?;

        Ok(self
            .draw
            .iter()
            .map(|entry| {
                entry
                    .tokens()
                    .iter()
                    .map(|token| FixToken::parse_draw(token))
                    .collect()
            })
            .collect())
    }

    /// Every fix name referenced by this procedure, first occurrence first:
    /// entries, body, exits, then draw segments.
    pub fn all_fix_names_in_use(&self) -> ProcedureResult<Vec<String>> {
        self.check_draw()?;

        let segment_names = |segments: &SegmentMap| {
            segments
                .values()
                .flatten()
                .filter_map(FixDescriptor::bare_name)
                .unique()
                .collect::<Vec<_>>()
        };
        let entry_names = segment_names(&self.entry_points);
        let body_names = self.body.iter().filter_map(FixDescriptor::bare_name);
        let exit_names = segment_names(&self.exit_points);
        let draw_names = self
            .draw
            .iter()
            .flat_map(DrawEntry::tokens)
            .map(|token| FixToken::parse_draw(token).bare_name);

        let names = entry_names
            .into_iter()
            .chain(body_names)
            .chain(exit_names)
            .chain(draw_names)
            .unique()
            .collect::<Vec<_>>();
        trace!("{}: {} fix names in use", self.icao, names.len());

        Ok(names)
    }

    fn entry_segment(&self, entry: &str) -> ProcedureResult<&[FixDescriptor]> {
        self.entry_points
            .get(entry)
            .map(Vec::as_slice)
            .ok_or_else(|| ProcedureError::UnknownEntry {
                icao: self.icao.clone(),
                entry: entry.to_string(),
            })
    }

    fn exit_segment(&self, exit: &str) -> ProcedureResult<&[FixDescriptor]> {
        self.exit_points
            .get(exit)
            .map(Vec::as_slice)
            .ok_or_else(|| ProcedureError::UnknownExit {
                icao: self.icao.clone(),
                exit: exit.to_string(),
            })
    }

    pub fn waypoints_for_body<W: FromFixDescriptor>(&self) -> Vec<W> {
        self.body.iter().map(W::from_fix_descriptor).collect()
    }

    pub fn waypoints_for_entry<W: FromFixDescriptor>(
        &self,
        entry: &str,
    ) -> ProcedureResult<Vec<W>> {
        Ok(self
            .entry_segment(entry)?
            .iter()
            .map(W::from_fix_descriptor)
            .collect())
    }

    pub fn waypoints_for_exit<W: FromFixDescriptor>(
        &self,
        exit: &str,
    ) -> ProcedureResult<Vec<W>> {
        Ok(self
            .exit_segment(exit)?
            .iter()
            .map(W::from_fix_descriptor)
            .collect())
    }

    /// Full route through the procedure: entry segment, body, exit segment.
    ///
    /// Unknown keys are logged and returned as lookup errors, never panics, so a
    /// controller probing clearances cannot take down the simulation.
    pub fn waypoints_for_entry_and_exit<W: FromFixDescriptor>(
        &self,
        entry: &str,
        exit: &str,
    ) -> ProcedureResult<Vec<W>> {
        let segments = self
            .entry_segment(entry)
            .and_then(|entry| Ok((entry, self.exit_segment(exit)?)));
        let (entry_segment, exit_segment) = segments.inspect_err(|e| warn!("{e}"))?;

        Ok(entry_segment
            .iter()
            .chain(&self.body)
            .chain(exit_segment)
            .map(W::from_fix_descriptor)
            .collect())
    }

    /// Uniformly picks one of the exit keys.
    pub fn random_exit_point_with(&self, rng: &mut impl rand::Rng) -> ProcedureResult<&str> {
        if self.exit_points.is_empty() {
            return Err(ProcedureError::NoExitPoints {
                icao: self.icao.clone(),
            });
        }

        let index = rng.random_range(0..self.exit_points.len());
        self.exit_points
            .name_at(index)
            .ok_or_else(|| ProcedureError::NoExitPoints {
                icao: self.icao.clone(),
            })
    }

    pub fn random_exit_point(&self) -> ProcedureResult<&str> {
        self.random_exit_point_with(&mut rand::rng())
    }
}
