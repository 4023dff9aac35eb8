use serde::{Serialize, Deserialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use crate::feature::lbp::Operator;
use crate::feature::histogram::HistogramConfig;
use crate::feature::lda::LdaConfig;
use crate::error::Result;

/// Settings of a full recognition pipeline, read from the outside world (e.g. a JSON file):
///
/// ```json
/// {
///     "operator" : { "kind" : "extended", "radius" : 1, "neighbors" : 8 },
///     "histogram" : { "grid_x" : 8, "grid_y" : 8, "normed" : true },
///     "lda" : { "num_components" : 0, "data_as_row" : true }
/// }
/// ```
///
/// Missing fields take their default values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub operator : Operator,
    pub histogram : HistogramConfig,
    pub lda : LdaConfig
}

impl Config {

    pub fn load_from_path<P>(path : P) -> Result<Self>
    where
        P : AsRef<Path>
    {
        let f = File::open(path)?;
        Self::load(f)
    }

    pub fn load<R>(mut reader : R) -> Result<Self>
    where
        R : Read
    {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let config = serde_json::from_str(&content[..])?;
        Ok(config)
    }

    pub fn save_to_path<P>(&self, path : P) -> Result<()>
    where
        P : AsRef<Path>
    {
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        self.save(file)
    }

    pub fn save<W>(&self, mut writer : W) -> Result<()>
    where
        W : Write
    {
        let content = serde_json::to_string_pretty(self)?;
        writer.write_all(content.as_bytes())?;
        Ok(())
    }

}
