//! The assembly catalog built by Pass 1 and read by every later pass.
//!
//! Assemblies are kept in declaration order. Lookup by id returns the first
//! declaration, so a later duplicate is stored but never reached.

use crate::fields;
use crate::geometry::XBox;
use crate::reader::has_tag;
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use std::ops::Range;

/// Record tags for solids and openings. Only `&OBST` is a solid.
pub const GEOMETRY_TAGS: [&str; 3] = ["&OBST", "&HOLE", "&VENT"];
pub const SOLID_TAG: &str = "&OBST";
pub const REFERENCE_TAG: &str = "&GRP";
pub const GROUP_BEGIN_TAG: &str = "&BGRP";
pub const GROUP_END_TAG: &str = "&EGRP";
pub const INCLUDE_TAG: &str = "&INCL";

// ──────────────────────────────────────────────
// Provenance
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provenance {
    pub file: String,
    pub line: u32,
}

// ──────────────────────────────────────────────
// Member records
// ──────────────────────────────────────────────

/// The instantiation parameters of an `&GRP` record.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSpec {
    pub target: Option<String>,
    pub offset: Vector3<f64>,
    pub rotate: f64,
}

impl ReferenceSpec {
    /// Read `GRP_ID`, `XYZ` and `ROTATE`; absent values mean no translation
    /// and no rotation. A short `XYZ` keeps the axes it gives and zeroes the rest.
    pub fn parse(line: &str) -> Self {
        let mut offset = Vector3::zeros();
        if let Some(field) = fields::key_floats(line, "XYZ", 3) {
            if field.values.len() < 3 {
                tracing::warn!(
                    record = %line,
                    given = field.values.len(),
                    "XYZ has fewer than three values; missing axes are zero"
                );
            }
            for (axis, v) in field.values.iter().enumerate() {
                offset[axis] = *v;
            }
        }
        let rotate = fields::key_array::<1>(line, "ROTATE")
            .map(|([r], _)| r)
            .unwrap_or(0.0);
        ReferenceSpec {
            target: fields::key_text(line, "GRP_ID"),
            offset,
            rotate,
        }
    }

    pub fn target_label(&self) -> &str {
        self.target.as_deref().unwrap_or("(none)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    /// `&OBST`, `&HOLE` or `&VENT` with a complete `XB`. `span` is the byte
    /// range of the six numbers inside the record text.
    Geometry {
        xbox: XBox,
        solid: bool,
        span: Range<usize>,
    },
    Reference(ReferenceSpec),
    Other,
}

/// One record declared between `&BGRP` and `&EGRP`.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub text: String,
    pub prov: Provenance,
    pub kind: MemberKind,
}

impl Member {
    pub fn classify(text: String, prov: Provenance) -> Self {
        let kind = if GEOMETRY_TAGS.iter().any(|t| has_tag(&text, t)) {
            match fields::key_array::<6>(&text, "XB") {
                Some((xb, span)) => MemberKind::Geometry {
                    xbox: XBox::from_xb(xb),
                    solid: has_tag(&text, SOLID_TAG),
                    span,
                },
                None => {
                    tracing::warn!(
                        file = %prov.file,
                        line = prov.line,
                        "geometry record without a six-value XB is left out of expansion"
                    );
                    MemberKind::Other
                }
            }
        } else if has_tag(&text, REFERENCE_TAG) {
            MemberKind::Reference(ReferenceSpec::parse(&text))
        } else {
            MemberKind::Other
        };
        Member { text, prov, kind }
    }

    /// Text before the `XB` values, for geometry members.
    pub fn prefix(&self) -> &str {
        match &self.kind {
            MemberKind::Geometry { span, .. } => &self.text[..span.start],
            _ => "",
        }
    }

    /// Text after the `XB` values, for geometry members.
    pub fn suffix(&self) -> &str {
        match &self.kind {
            MemberKind::Geometry { span, .. } => &self.text[span.end..],
            _ => "",
        }
    }

    /// The record with its `XB` values replaced by `xbox`.
    pub fn with_box(&self, xbox: &XBox) -> String {
        let values: Vec<String> = xbox.to_xb().iter().map(|v| fields::format_coord(*v)).collect();
        format!("{}{}{}", self.prefix(), values.join(","), self.suffix())
    }
}

// ──────────────────────────────────────────────
// Assemblies
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub id: String,
    /// Explicit `ORIG`, or the running minimum over solid members.
    pub origin: Point3<f64>,
    pub origin_defined: bool,
    /// Running maximum over solid members.
    pub extent_max: Point3<f64>,
    /// `extent_max - origin`, refreshed as solids arrive.
    pub size: Vector3<f64>,
    /// Bounding box of the fully expanded geometry, set by Pass 3.
    pub bounds: Option<XBox>,
    pub members: Vec<Member>,
    pub in_use: bool,
    pub prov: Provenance,
}

impl Assembly {
    pub fn new(id: String, origin: Option<Point3<f64>>, prov: Provenance) -> Self {
        Assembly {
            id,
            origin: origin.unwrap_or_else(|| Point3::new(f64::MAX, f64::MAX, f64::MAX)),
            origin_defined: origin.is_some(),
            extent_max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
            size: Vector3::zeros(),
            bounds: None,
            members: Vec::new(),
            in_use: false,
            prov,
        }
    }

    /// Append a member, letting solids widen the derived origin and extent.
    pub fn push_member(&mut self, member: Member) {
        if let MemberKind::Geometry {
            xbox, solid: true, ..
        } = &member.kind
        {
            if !self.origin_defined {
                self.origin = self.origin.inf(&xbox.min);
            }
            self.extent_max = self.extent_max.sup(&xbox.max);
            self.size = self.extent_max - self.origin;
        }
        self.members.push(member);
    }

    /// Settle an origin that no `ORIG` and no solid ever set.
    pub(crate) fn settle_origin(&mut self) {
        if !self.origin_defined && self.origin.x == f64::MAX {
            self.origin = Point3::origin();
            self.size = Vector3::zeros();
        }
    }

    pub fn references(&self) -> impl Iterator<Item = &ReferenceSpec> {
        self.members.iter().filter_map(|m| match &m.kind {
            MemberKind::Reference(spec) => Some(spec),
            _ => None,
        })
    }

    /// Running maximum over solid members, `None` until a solid arrives.
    pub fn solid_extent(&self) -> Option<Point3<f64>> {
        (self.extent_max.x != f64::MIN).then_some(self.extent_max)
    }

    /// Size of the bounding box, zero before Pass 3 or for empty assemblies.
    pub fn bounds_size(&self) -> Vector3<f64> {
        self.bounds.map(|b| b.size()).unwrap_or_else(Vector3::zeros)
    }

    pub fn summary(&self) -> AssemblySummary {
        let (bounds_min, bounds_max) = match self.bounds {
            Some(b) => (Some(b.min.into()), Some(b.max.into())),
            None => (None, None),
        };
        AssemblySummary {
            id: self.id.clone(),
            file: self.prov.file.clone(),
            line: self.prov.line,
            origin: self.origin.into(),
            origin_defined: self.origin_defined,
            bounds_min,
            bounds_max,
            size: self.bounds_size().into(),
            extent_max: self.solid_extent().map(Into::into),
            derived_size: self.size.into(),
            members: self.members.len(),
            references: self
                .references()
                .map(|r| r.target_label().to_string())
                .collect(),
            in_use: self.in_use,
        }
    }
}

/// Plain-data view of one assembly for reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblySummary {
    pub id: String,
    pub file: String,
    pub line: u32,
    pub origin: [f64; 3],
    pub origin_defined: bool,
    pub bounds_min: Option<[f64; 3]>,
    pub bounds_max: Option<[f64; 3]>,
    pub size: [f64; 3],
    /// Solid-member extent and `extent_max - origin`, independent of Pass 3.
    pub extent_max: Option<[f64; 3]>,
    pub derived_size: [f64; 3],
    pub members: usize,
    pub references: Vec<String>,
    pub in_use: bool,
}

// ──────────────────────────────────────────────
// Catalog
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    assemblies: Vec<Assembly>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    /// Append an assembly and return its index.
    pub fn push(&mut self, assembly: Assembly) -> usize {
        if let Some(first) = self.find(&assembly.id) {
            tracing::warn!(
                id = %assembly.id,
                file = %assembly.prov.file,
                line = assembly.prov.line,
                first_file = %self.assemblies[first].prov.file,
                first_line = self.assemblies[first].prov.line,
                "duplicate assembly id; the first declaration is used"
            );
        }
        self.assemblies.push(assembly);
        self.assemblies.len() - 1
    }

    /// Index of the first assembly declared with `id`.
    pub fn find(&self, id: &str) -> Option<usize> {
        self.assemblies.iter().position(|a| a.id == id)
    }

    pub fn get(&self, idx: usize) -> Option<&Assembly> {
        self.assemblies.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Assembly> {
        self.assemblies.get_mut(idx)
    }

    pub fn by_id(&self, id: &str) -> Option<&Assembly> {
        self.find(id).map(|i| &self.assemblies[i])
    }

    /// Resolve a reference to the index of its target.
    pub fn resolve(&self, spec: &ReferenceSpec) -> Option<usize> {
        spec.target.as_deref().and_then(|id| self.find(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assembly> {
        self.assemblies.iter()
    }

    /// End of Pass 1: no assemblies are added after this.
    pub(crate) fn freeze(&mut self) {
        for a in &mut self.assemblies {
            a.settle_origin();
        }
    }

    pub fn set_bounds(&mut self, idx: usize, bounds: Option<XBox>) {
        if let Some(a) = self.assemblies.get_mut(idx) {
            a.bounds = bounds;
        }
    }

    pub fn mark_in_use(&mut self, indices: impl IntoIterator<Item = usize>) {
        for idx in indices {
            if let Some(a) = self.assemblies.get_mut(idx) {
                a.in_use = true;
            }
        }
    }

    /// Ids of assemblies no expansion ever reached, in declaration order.
    pub fn unused(&self) -> Vec<String> {
        self.assemblies
            .iter()
            .filter(|a| !a.in_use)
            .map(|a| a.id.clone())
            .collect()
    }

    pub fn summaries(&self) -> Vec<AssemblySummary> {
        self.assemblies.iter().map(Assembly::summary).collect()
    }
}
