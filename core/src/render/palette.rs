use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// The ten-entry categorical palette ("tab10").
pub const TAB10: [Rgb; 10] = [
    Rgb::new(0x1f, 0x77, 0xb4),
    Rgb::new(0xff, 0x7f, 0x0e),
    Rgb::new(0x2c, 0xa0, 0x2c),
    Rgb::new(0xd6, 0x27, 0x28),
    Rgb::new(0x94, 0x67, 0xbd),
    Rgb::new(0x8c, 0x56, 0x4b),
    Rgb::new(0xe3, 0x77, 0xc2),
    Rgb::new(0x7f, 0x7f, 0x7f),
    Rgb::new(0xbc, 0xbd, 0x22),
    Rgb::new(0x17, 0xbe, 0xcf),
];

/// Samples `count` colors evenly across [`TAB10`], first and last entry
/// included. With more than ten subjects colors repeat in runs.
pub fn resample(count: usize) -> Vec<Rgb> {
    match count {
        0 => Vec::new(),
        1 => vec![TAB10[0]],
        _ => {
            let step = 1.0 / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    let x = if i == count - 1 { 1.0 } else { i as f64 * step };
                    let slot = ((x * TAB10.len() as f64) as usize).min(TAB10.len() - 1);
                    TAB10[slot]
                })
                .collect()
        }
    }
}

/// Subject-to-color assignment over every subject of a dataset, so colors
/// stay put when the selection changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    colors: BTreeMap<String, Rgb>,
}

impl Palette {
    pub fn for_subjects(subjects: &[String]) -> Self {
        let colors = subjects
            .iter()
            .cloned()
            .zip(resample(subjects.len()))
            .collect();
        Self { colors }
    }

    pub fn color_of(&self, subject_id: &str) -> Rgb {
        self.colors.get(subject_id).copied().unwrap_or(TAB10[0])
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
