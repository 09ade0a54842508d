//! Bundled sample: Argos fixes of three Arctic foxes (Vulpes lagopus)
//! around Karupelv, north-east Greenland.

pub const SAMPLE_NAME: &str = "sample.csv";

const SAMPLE_CSV: &[u8] = include_bytes!("../data/sample.csv");

pub fn sample_bytes() -> &'static [u8] {
    SAMPLE_CSV
}
