//! # Architecture Registry
//!
//! [`Architecture`] names each classifier network, so a harness can
//! select one by name without knowing its config type.

use crate::errors::NetworkError;
use crate::models::alexnet::AlexNetConfig;
use crate::models::classifier::{ClassifierConfig, ClassifierStructure};
use crate::models::inception::googlenet::GoogleNetConfig;
use crate::models::lenet::LeNetConfig;
use crate::models::resnet::resnet50::ResNet50Config;
use crate::models::vgg::Vgg16Config;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A named classifier architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    /// [`LeNetConfig`].
    LeNet,

    /// [`AlexNetConfig`].
    AlexNet,

    /// [`Vgg16Config`].
    Vgg16,

    /// [`ResNet50Config`].
    ResNet50,

    /// [`GoogleNetConfig`].
    GoogleNet,
}

impl Architecture {
    /// Every architecture.
    pub const ALL: [Architecture; 5] = [
        Architecture::LeNet,
        Architecture::AlexNet,
        Architecture::Vgg16,
        Architecture::ResNet50,
        Architecture::GoogleNet,
    ];

    /// The canonical lower-case name.
    pub fn name(&self) -> &'static str {
        self.structure().name()
    }

    /// The default config, as a [`ClassifierStructure`].
    pub fn structure(&self) -> Box<dyn ArchitectureStructure> {
        match self {
            Architecture::LeNet => Box::new(LeNetConfig::new()),
            Architecture::AlexNet => Box::new(AlexNetConfig::new()),
            Architecture::Vgg16 => Box::new(Vgg16Config::new()),
            Architecture::ResNet50 => Box::new(ResNet50Config::new()),
            Architecture::GoogleNet => Box::new(GoogleNetConfig::new()),
        }
    }

    /// The default config, lowered to a [`ClassifierConfig`].
    pub fn classifier_config(&self) -> ClassifierConfig {
        self.structure().lower()
    }
}

/// Object-safe view of a [`ClassifierStructure`].
pub trait ArchitectureStructure {
    /// The architecture name.
    fn name(&self) -> &'static str;

    /// Lower to a [`ClassifierConfig`].
    fn lower(&self) -> ClassifierConfig;
}

impl<T: ClassifierStructure> ArchitectureStructure for T {
    fn name(&self) -> &'static str {
        ClassifierStructure::name(self)
    }

    fn lower(&self) -> ClassifierConfig {
        self.to_classifier()
    }
}

impl Display for Architecture {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Architecture {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Architecture::ALL
            .into_iter()
            .find(|arch| arch.name() == needle)
            .ok_or_else(|| {
                NetworkError::configuration(
                    "architecture",
                    format!(
                        "unknown architecture {s:?}; expected one of {}",
                        Architecture::ALL.map(|arch| arch.name()).join(", ")
                    ),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::FeatureShape;
    use hamcrest::prelude::*;

    #[test]
    fn test_names_round_trip() {
        let names: Vec<&str> = Architecture::ALL.iter().map(Architecture::name).collect();
        assert_eq!(
            names,
            vec!["lenet", "alexnet", "vgg16", "resnet50", "googlenet"]
        );
        for arch in Architecture::ALL {
            assert_that!(arch.to_string().parse::<Architecture>(), equal_to(Ok(arch)));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("ResNet50".parse::<Architecture>(), Ok(Architecture::ResNet50));
        assert_eq!(
            " GoogLeNet ".parse::<Architecture>(),
            Ok(Architecture::GoogleNet)
        );
    }

    #[test]
    fn test_unknown_name() {
        let err = "efficientnet".parse::<Architecture>().unwrap_err();
        assert!(matches!(err, NetworkError::Configuration { .. }));
        assert_eq!(err.stage(), "architecture");
        assert!(err.to_string().contains("lenet, alexnet"));
    }

    #[test]
    fn test_every_default_is_valid() {
        for arch in Architecture::ALL {
            let shapes = arch.classifier_config().try_infer().unwrap();
            assert_eq!(shapes.input, FeatureShape::new(1, 128, 128));
            assert_eq!(shapes.num_classes, 20, "{arch}");
        }
    }
}
