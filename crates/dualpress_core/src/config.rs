use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Unit of a target-size specification. The serialized tokens are exactly
/// `kilobyte` and `megabyte`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Kilobyte,
    Megabyte,
}

impl SizeUnit {
    pub fn token(self) -> &'static str {
        match self {
            SizeUnit::Kilobyte => "kilobyte",
            SizeUnit::Megabyte => "megabyte",
        }
    }

    /// Single-letter flag understood by the compressor script.
    fn flag(self) -> char {
        match self {
            SizeUnit::Kilobyte => 'k',
            SizeUnit::Megabyte => 'm',
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            SizeUnit::Kilobyte => "KB",
            SizeUnit::Megabyte => "MB",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kilobyte" => Ok(SizeUnit::Kilobyte),
            "megabyte" => Ok(SizeUnit::Megabyte),
            other => Err(format!(
                "unknown size unit '{other}' (expected 'kilobyte' or 'megabyte')"
            )),
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSize {
    pub value: u32,
    pub unit: SizeUnit,
}

impl TargetSize {
    pub const fn new(value: u32, unit: SizeUnit) -> Self {
        Self { value, unit }
    }

    pub const fn kilobytes(value: u32) -> Self {
        Self::new(value, SizeUnit::Kilobyte)
    }

    pub const fn megabytes(value: u32) -> Self {
        Self::new(value, SizeUnit::Megabyte)
    }

    /// Argument form passed to the compressor script, e.g. `-k300`.
    pub fn script_arg(&self) -> String {
        format!("-{}{}", self.unit.flag(), self.value)
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        Self::megabytes(1)
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// Named quick settings for the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Web,
    Social,
    Standard,
    Quality,
    Print,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Web,
        Preset::Social,
        Preset::Standard,
        Preset::Quality,
        Preset::Print,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Web => "web",
            Preset::Social => "social",
            Preset::Standard => "standard",
            Preset::Quality => "quality",
            Preset::Print => "print",
        }
    }

    pub fn target_size(self) -> TargetSize {
        match self {
            Preset::Web => TargetSize::kilobytes(300),
            Preset::Social => TargetSize::kilobytes(800),
            Preset::Standard => TargetSize::megabytes(1),
            Preset::Quality => TargetSize::megabytes(2),
            Preset::Print => TargetSize::megabytes(3),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<_> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset '{s}' (expected one of {})", names.join(", "))
            })
    }
}

/// Required fields of a [`JobConfiguration`], in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    InputLocation,
    OutputLocation,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigField::InputLocation => f.write_str("input location"),
            ConfigField::OutputLocation => f.write_str("output location"),
        }
    }
}

/// Immutable snapshot of the parameters a job is started with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfiguration {
    pub input_location: PathBuf,
    pub output_location: PathBuf,
    pub target_size: TargetSize,
    pub parallelism: u32,
}

impl JobConfiguration {
    pub fn new(
        input_location: impl Into<PathBuf>,
        output_location: impl Into<PathBuf>,
        target_size: TargetSize,
        parallelism: u32,
    ) -> Self {
        Self {
            input_location: input_location.into(),
            output_location: output_location.into(),
            target_size,
            parallelism,
        }
    }

    /// Checks required fields in order (input, then output) before the
    /// numeric constraints; reports the first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.input_location) {
            return Err(ValidationError::MissingField(ConfigField::InputLocation));
        }
        if is_blank(&self.output_location) {
            return Err(ValidationError::MissingField(ConfigField::OutputLocation));
        }
        if self.target_size.value == 0 {
            return Err(ValidationError::ZeroTargetSize);
        }
        if self.parallelism == 0 {
            return Err(ValidationError::ZeroParallelism);
        }
        Ok(())
    }
}

fn is_blank(path: &Path) -> bool {
    path.to_string_lossy().trim().is_empty()
}
