//! Code for loading and running (trained) TorchScript classifiers

use crate::config;
use crate::preprocess;
use anyhow::{anyhow, Result};
use std::fmt;
use tch::{no_grad, Kind, Tensor};

/// The winning class of a classifier's output distribution
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

impl fmt::Display for Prediction {
    /// `<label>|<confidence>`, confidence with four decimal places
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{:.4}", self.label, self.confidence)
    }
}

/// Load and run a TorchScript file
#[derive(Debug)]
pub struct TorchModel {
    /// The loaded torch model
    model: tch::jit::CModule,
}

impl TorchModel {
    pub fn new(filename: &str) -> Result<Self> {
        Ok(TorchModel {
            model: tch::CModule::load(filename)?,
        })
    }

    /// Run image classification on an encoded (JPEG/PNG/...) image.
    /// The model output is already a distribution, so it is used as-is
    pub fn classify(&self, image: &[u8]) -> Result<Prediction> {
        let settings = config::settings();
        let size = settings.input_size as i64;

        let pixels = preprocess::image_to_pixels(image, settings.input_size)?;
        let input = Tensor::from_slice(&pixels).view([1, size, size, 3]);

        let output = no_grad(|| self.model.forward_ts(&[input]))?;
        let flat = output.to_kind(Kind::Float).view([-1]);
        let probs = Vec::<f32>::try_from(&flat)?;

        best_class(&probs, &settings.class_names)
    }
}

/// Pick the winning class from an output distribution. Ties resolve to the
/// lowest index
pub fn best_class(probs: &[f32], class_names: &[String]) -> Result<Prediction> {
    let (index, confidence) = probs
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &p)| match best {
            Some((_, top)) if p <= top => best,
            _ => Some((i, p)),
        })
        .ok_or_else(|| anyhow!("model returned an empty distribution"))?;

    let label = class_names
        .get(index)
        .ok_or_else(|| anyhow!("no class name for output index {index}"))?;

    Ok(Prediction {
        label: label.clone(),
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn class_names() -> Vec<String> {
        vec!["Marigold".to_string(), "Scarlet Sage".to_string()]
    }

    fn test_image() -> Vec<u8> {
        let mut img = RgbImage::new(320, 240);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([220, 140, 30]);
        }
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_first_class_wins() {
        let prediction = best_class(&[0.9, 0.1], &class_names()).unwrap();
        assert_eq!(prediction.to_string(), "Marigold|0.9000");
    }

    #[test]
    fn test_second_class_wins() {
        let prediction = best_class(&[0.2, 0.8], &class_names()).unwrap();
        assert_eq!(prediction.to_string(), "Scarlet Sage|0.8000");
    }

    #[test]
    fn test_tie_takes_lowest_index() {
        let prediction = best_class(&[0.5, 0.5], &class_names()).unwrap();
        assert_eq!(prediction.label, "Marigold");
    }

    #[test]
    fn test_confidence_has_four_decimals() {
        let prediction = Prediction {
            label: "Marigold".to_string(),
            confidence: 0.97314,
        };
        assert_eq!(prediction.to_string(), "Marigold|0.9731");
    }

    #[test]
    fn test_empty_distribution_is_an_error() {
        assert!(best_class(&[], &class_names()).is_err());
    }

    #[test]
    fn test_missing_class_name_is_an_error() {
        assert!(best_class(&[0.1, 0.2, 0.7], &class_names()).is_err());
    }

    #[test]
    fn test_flower_model() {
        // Skip if the model artifact is not present
        let settings = crate::config::settings();
        if !std::path::Path::new(&settings.model_file).exists() {
            println!("skipping: {} not found", settings.model_file);
            return;
        }

        let model = TorchModel::new(&settings.model_file).unwrap();
        let prediction = model.classify(&test_image()).unwrap();

        assert!(class_names().contains(&prediction.label));
        assert!((0.0..=1.0).contains(&prediction.confidence));
    }
}
