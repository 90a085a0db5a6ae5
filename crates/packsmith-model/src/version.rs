use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum DevelopmentalStage {
    Alpha,
    Beta,
    ReleaseCandidate,
    #[default]
    Release,
}

impl DevelopmentalStage {
    pub const ALL: [Self; 4] = [
        Self::Release,
        Self::ReleaseCandidate,
        Self::Beta,
        Self::Alpha,
    ];

    #[must_use]
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Alpha => Some("a"),
            Self::Beta => Some("b"),
            Self::ReleaseCandidate => Some("rc"),
            Self::Release => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Alpha => "Alpha",
            Self::Beta => "Beta",
            Self::ReleaseCandidate => "Release Candidate",
            Self::Release => "Release",
        }
    }

    /// Case-insensitive lookup by label or suffix (`beta`, `b`, `rc`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|stage| {
            stage.label().eq_ignore_ascii_case(name)
                || stage
                    .suffix()
                    .is_some_and(|suffix| suffix.eq_ignore_ascii_case(name))
                || (*stage == Self::ReleaseCandidate && name.eq_ignore_ascii_case("releasecandidate"))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
    Build,
    Revision,
    DevelopmentBuild,
}

impl VersionComponent {
    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Major,
            1 => Self::Minor,
            2 => Self::Build,
            _ => Self::Revision,
        }
    }
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Build => write!(f, "build"),
            Self::Revision => write!(f, "revision"),
            Self::DevelopmentBuild => write!(f, "development build"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Expected a version like 1.2.0.0 or 1.2.0.0b1, got: {input}")]
    InvalidFormat { input: String },
    #[error("Invalid {component} version: {value}")]
    InvalidComponent {
        component: VersionComponent,
        value: String,
    },
}

fn parse_component(component: VersionComponent, value: &str) -> Result<u32, VersionParseError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionParseError::InvalidComponent {
            component,
            value: value.to_string(),
        });
    }
    value
        .parse()
        .map_err(|_| VersionParseError::InvalidComponent {
            component,
            value: value.to_string(),
        })
}

/// Splits `2-4` dot-separated numeric components into a zero-padded array.
fn parse_numeric_core(input: &str, core: &str) -> Result<([u32; 4], u8), VersionParseError> {
    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() < 2 || parts.len() > 4 {
        return Err(VersionParseError::InvalidFormat {
            input: input.to_string(),
        });
    }

    let mut components = [0u32; 4];
    for (index, part) in parts.iter().enumerate() {
        components[index] = parse_component(VersionComponent::from_index(index), part)?;
    }

    #[allow(clippy::cast_possible_truncation)]
    Ok((components, parts.len() as u8))
}

/// Release identifier of a package: four numeric components plus an optional
/// pre-release stage (`1.2.0.0b3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UpdateVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
    pub stage: DevelopmentalStage,
    pub development_build: u32,
}

impl UpdateVersion {
    #[must_use]
    pub fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
            stage: DevelopmentalStage::Release,
            development_build: 0,
        }
    }

    /// Development builds only exist for pre-release stages; a release always
    /// carries `0`.
    #[must_use]
    pub fn with_stage(mut self, stage: DevelopmentalStage, development_build: u32) -> Self {
        self.stage = stage;
        self.development_build = if stage == DevelopmentalStage::Release {
            0
        } else {
            development_build
        };
        self
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.major == 0 && self.minor == 0 && self.build == 0 && self.revision == 0
    }

    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.stage != DevelopmentalStage::Release
    }

    /// Numeric part only, e.g. `1.2.0.0`.
    #[must_use]
    pub fn basic_version(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }

    /// Human readable form, e.g. `1.2.0.0 Beta 3`.
    #[must_use]
    pub fn description(&self) -> String {
        if self.is_prerelease() {
            format!(
                "{} {} {}",
                self.basic_version(),
                self.stage.label(),
                self.development_build
            )
        } else {
            self.basic_version()
        }
    }

    fn sort_key(&self) -> (u32, u32, u32, u32, DevelopmentalStage, u32) {
        (
            self.major,
            self.minor,
            self.build,
            self.revision,
            self.stage,
            self.development_build,
        )
    }
}

impl Ord for UpdateVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for UpdateVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for UpdateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )?;
        if let Some(suffix) = self.stage.suffix() {
            write!(f, "{suffix}{}", self.development_build)?;
        }
        Ok(())
    }
}

impl FromStr for UpdateVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        let (core, stage, development_build) =
            match input.find(|c: char| c.is_ascii_alphabetic()) {
                Some(pos) => {
                    let (core, suffix) = input.split_at(pos);
                    let lower = suffix.to_ascii_lowercase();
                    let (stage, number) = if let Some(rest) = lower.strip_prefix("rc") {
                        (DevelopmentalStage::ReleaseCandidate, rest.to_string())
                    } else if let Some(rest) = lower.strip_prefix('a') {
                        (DevelopmentalStage::Alpha, rest.to_string())
                    } else if let Some(rest) = lower.strip_prefix('b') {
                        (DevelopmentalStage::Beta, rest.to_string())
                    } else {
                        return Err(VersionParseError::InvalidFormat {
                            input: input.to_string(),
                        });
                    };
                    let build = parse_component(VersionComponent::DevelopmentBuild, &number)?;
                    (core, stage, build)
                }
                None => (input, DevelopmentalStage::Release, 0),
            };

        let (components, _) = parse_numeric_core(input, core)?;

        Ok(UpdateVersion::new(
            components[0],
            components[1],
            components[2],
            components[3],
        )
        .with_stage(stage, development_build))
    }
}

impl TryFrom<String> for UpdateVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UpdateVersion> for String {
    fn from(value: UpdateVersion) -> Self {
        value.to_string()
    }
}

/// A numeric threshold such as an OS build (`6.1.7601.0`) or a runtime
/// release (`4.7.2`). Missing trailing components compare as zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequirementVersion {
    components: [u32; 4],
    len: u8,
}

impl RequirementVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            components: [major, minor, build, revision],
            len: 4,
        }
    }

    #[must_use]
    pub const fn short(major: u32, minor: u32, build: u32) -> Self {
        Self {
            components: [major, minor, build, 0],
            len: 3,
        }
    }

    #[must_use]
    pub fn major(&self) -> u32 {
        self.components[0]
    }

    #[must_use]
    pub fn minor(&self) -> u32 {
        self.components[1]
    }

    /// Renders the first `count` components (clamped to `1..=4`).
    #[must_use]
    pub fn to_string_components(&self, count: usize) -> String {
        self.components[..count.clamp(1, 4)]
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl PartialEq for RequirementVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for RequirementVersion {}

impl Hash for RequirementVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

impl Ord for RequirementVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl PartialOrd for RequirementVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RequirementVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_components(usize::from(self.len)))
    }
}

impl FromStr for RequirementVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let (components, len) = parse_numeric_core(input, input)?;
        Ok(Self { components, len })
    }
}

impl TryFrom<String> for RequirementVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RequirementVersion> for String {
    fn from(value: RequirementVersion) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_release_version() {
        let v: UpdateVersion = "1.2.3.4".parse().expect("version should parse");
        assert_eq!((v.major, v.minor, v.build, v.revision), (1, 2, 3, 4));
        assert_eq!(v.stage, DevelopmentalStage::Release);
        assert_eq!(v.development_build, 0);
    }

    #[test]
    fn parse_pads_missing_components() {
        let v: UpdateVersion = "  2.1  ".parse().expect("version should parse");
        assert_eq!(v, UpdateVersion::new(2, 1, 0, 0));
        assert_eq!(v.to_string(), "2.1.0.0");
    }

    #[test]
    fn parse_stage_suffixes() {
        let beta: UpdateVersion = "1.2.0.0b3".parse().expect("version should parse");
        assert_eq!(beta.stage, DevelopmentalStage::Beta);
        assert_eq!(beta.development_build, 3);

        let rc: UpdateVersion = "2.0RC1".parse().expect("version should parse");
        assert_eq!(rc.stage, DevelopmentalStage::ReleaseCandidate);
        assert_eq!(rc.to_string(), "2.0.0.0rc1");

        let alpha: UpdateVersion = "0.9.1a12".parse().expect("version should parse");
        assert_eq!(alpha.stage, DevelopmentalStage::Alpha);
        assert_eq!(alpha.development_build, 12);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(matches!(
            "1".parse::<UpdateVersion>(),
            Err(VersionParseError::InvalidFormat { .. })
        ));
        assert!(matches!(
            "1.2.3.4.5".parse::<UpdateVersion>(),
            Err(VersionParseError::InvalidFormat { .. })
        ));
        assert!(matches!(
            "1.2.3.4x1".parse::<UpdateVersion>(),
            Err(VersionParseError::InvalidFormat { .. })
        ));
        assert!(matches!(
            "1.+2".parse::<UpdateVersion>(),
            Err(VersionParseError::InvalidComponent {
                component: VersionComponent::Minor,
                ..
            })
        ));
        assert!(matches!(
            "1.2b".parse::<UpdateVersion>(),
            Err(VersionParseError::InvalidComponent {
                component: VersionComponent::DevelopmentBuild,
                ..
            })
        ));
    }

    #[test]
    fn description_names_the_stage() {
        let v: UpdateVersion = "1.2.0.0b3".parse().expect("version should parse");
        assert_eq!(v.description(), "1.2.0.0 Beta 3");
        assert_eq!(UpdateVersion::new(3, 0, 0, 0).description(), "3.0.0.0");
    }

    #[test]
    fn ordering_puts_prereleases_before_release() {
        let alpha: UpdateVersion = "1.0.0.0a1".parse().expect("version should parse");
        let beta1: UpdateVersion = "1.0.0.0b1".parse().expect("version should parse");
        let beta2: UpdateVersion = "1.0.0.0b2".parse().expect("version should parse");
        let release: UpdateVersion = "1.0.0.0".parse().expect("version should parse");
        let next: UpdateVersion = "1.0.0.1a1".parse().expect("version should parse");

        assert!(alpha < beta1);
        assert!(beta1 < beta2);
        assert!(beta2 < release);
        assert!(release < next);
    }

    #[test]
    fn release_stage_drops_development_build() {
        let v = UpdateVersion::new(1, 0, 0, 0).with_stage(DevelopmentalStage::Release, 7);
        assert_eq!(v.development_build, 0);
        assert_eq!(v, UpdateVersion::new(1, 0, 0, 0));
    }

    #[test]
    fn zero_version_detection() {
        assert!(UpdateVersion::new(0, 0, 0, 0).is_zero());
        assert!(!UpdateVersion::new(0, 1, 0, 0).is_zero());
    }

    #[test]
    fn update_version_serializes_as_literal() {
        let v: UpdateVersion = "1.4.0.0rc2".parse().expect("version should parse");
        assert_eq!(serde_json::to_string(&v).expect("value should serialize"), "\"1.4.0.0rc2\"");
        let back: UpdateVersion = serde_json::from_str("\"1.4.0.0rc2\"").expect("value should serialize");
        assert_eq!(back, v);
        assert!(serde_json::from_str::<UpdateVersion>("\"nope\"").is_err());
    }

    #[test]
    fn stage_lookup_by_name_or_suffix() {
        assert_eq!(
            DevelopmentalStage::from_name("beta"),
            Some(DevelopmentalStage::Beta)
        );
        assert_eq!(
            DevelopmentalStage::from_name("rc"),
            Some(DevelopmentalStage::ReleaseCandidate)
        );
        assert_eq!(
            DevelopmentalStage::from_name("Release Candidate"),
            Some(DevelopmentalStage::ReleaseCandidate)
        );
        assert_eq!(DevelopmentalStage::from_name("gamma"), None);
    }

    #[test]
    fn requirement_version_ignores_missing_components() {
        let short: RequirementVersion = "4.7.2".parse().expect("version should parse");
        let long: RequirementVersion = "4.7.2.0".parse().expect("version should parse");
        assert_eq!(short, long);
        assert_eq!(short.to_string(), "4.7.2");
        assert_eq!(long.to_string(), "4.7.2.0");
        assert_eq!(long.to_string_components(3), "4.7.2");
    }

    #[test]
    fn requirement_version_ordering() {
        let vista: RequirementVersion = "6.0.6000.0".parse().expect("version should parse");
        let seven: RequirementVersion = "6.1.7600.0".parse().expect("version should parse");
        let ten: RequirementVersion = "10.0.10240.0".parse().expect("version should parse");
        assert!(vista < seven);
        assert!(seven < ten);
    }
}
