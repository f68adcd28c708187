//! Slider, pH field and acid/base count table.
//!
//! These are display models serialized to the page. They never hold the
//! truth: subscribers write into them after the counters change, and user
//! edits go through [`desired_protons`] to the reconciler. Writing a value
//! here never produces an edit.

use serde::{Deserialize, Serialize};

use crate::assets::SpriteSet;
use crate::chemistry::{format_ph, ph_to_protons, MAX_PROTONS, NUM_CONJUGATE_BASES};
use crate::input::{parse_float_prefix, parse_int_prefix};

pub const SLIDER_ID: &str = "protonCount";
pub const PH_FIELD_ID: &str = "pH";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    pub id: &'static str,
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhField {
    pub id: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountColumn {
    pub label: &'static str,
    pub sprite: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountTable {
    pub acid: CountColumn,
    pub separator: &'static str,
    pub conjugate_base: CountColumn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Views {
    pub labels: Vec<Label>,
    pub slider: Slider,
    pub ph: PhField,
    pub table: CountTable,
}

/// Which control the learner edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Slider,
    Ph,
}

/// Build every view once, seeded from the initial proton value.
pub fn build_views(initial_protons: i64, sprites: &SpriteSet) -> Views {
    Views {
        labels: vec![
            Label {
                text: "Number of free protons",
            },
            Label { text: "pH" },
            Label {
                text: "Acids and conjugate bases in the beaker",
            },
        ],
        slider: Slider {
            id: SLIDER_ID,
            min: 0,
            max: MAX_PROTONS,
            step: 1,
            value: initial_protons,
        },
        ph: PhField {
            id: PH_FIELD_ID,
            value: format_ph(initial_protons),
        },
        table: CountTable {
            acid: CountColumn {
                label: "acid",
                sprite: sprites.acid.clone(),
                count: 0,
            },
            separator: "\u{21cc}",
            conjugate_base: CountColumn {
                label: "conjugate base",
                sprite: sprites.conjugate_base.clone(),
                count: NUM_CONJUGATE_BASES,
            },
        },
    }
}

impl Views {
    /// Point the slider at `protons` and refresh the pH field.
    pub fn show_protons(&mut self, protons: u32) {
        self.slider.value = i64::from(protons);
        self.show_ph(protons);
    }

    pub fn show_ph(&mut self, protons: u32) {
        self.ph.value = format_ph(i64::from(protons));
    }

    pub fn show_acids(&mut self, acids: u32) {
        let acids = acids.min(NUM_CONJUGATE_BASES);
        self.table.acid.count = acids;
        self.table.conjugate_base.count = NUM_CONJUGATE_BASES - acids;
    }
}

/// Proton count requested by an edit, or `None` when the text is not a number.
pub fn desired_protons(control: Control, text: &str) -> Option<i64> {
    match control {
        Control::Slider => parse_int_prefix(text),
        Control::Ph => parse_float_prefix(text).map(ph_to_protons),
    }
}
