use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgb8;
use crate::foundation::error::DraggenResult;
use crate::foundation::token::token_enum;
use crate::library::asset::{ArtStyle, AssetType};
use crate::raster::payload::ImagePayload;

token_enum! {
    /// Camera angle requested from the generator.
    Perspective {
        /// Straight down.
        TopDown => "top-down",
        /// 2.5D, roughly 45 degrees.
        Isometric => "isometric",
        /// Side profile.
        Side => "side",
        /// Head-on.
        Front => "front",
        /// From behind.
        Rear => "rear",
    }
}

token_enum! {
    /// Output aspect ratio accepted by the generator.
    AspectRatio {
        /// Square.
        Square => "1:1",
        /// Portrait 3:4.
        Portrait => "3:4",
        /// Landscape 4:3.
        Landscape => "4:3",
        /// Widescreen 16:9.
        Wide => "16:9",
        /// Tall 9:16.
        Tall => "9:16",
    }
}

/// Paint color of a car.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintColor {
    /// A named color such as "red" or "gold".
    Named(String),
    /// An exact color.
    Custom(Rgb8),
}

impl PaintColor {
    /// Parse a `#rrggbb` custom color.
    pub fn from_hex(hex: &str) -> DraggenResult<Self> {
        Ok(Self::Custom(Rgb8::parse_hex(hex)?))
    }

    fn describe(&self) -> String {
        match self {
            PaintColor::Named(name) => format!("{} paint job", name.trim().to_lowercase()),
            PaintColor::Custom(rgb) => format!("custom paint color {}", rgb.to_hex()),
        }
    }
}

/// Everything the user picks before generating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Free-text subject details.
    pub prompt: String,
    /// Category of the asset.
    pub asset_type: AssetType,
    /// Art style.
    pub style: ArtStyle,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Camera angle.
    pub perspective: Perspective,
    /// Optional paint color, appended to the details.
    pub paint: Option<PaintColor>,
    /// Image the generator should condition on, usually a stored asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ImagePayload>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            asset_type: AssetType::Car,
            style: ArtStyle::Vector,
            aspect_ratio: AspectRatio::Square,
            perspective: Perspective::TopDown,
            paint: None,
            reference: None,
        }
    }
}

impl GenerationConfig {
    /// `true` when the prompt has no visible text.
    pub fn is_blank(&self) -> bool {
        self.prompt.trim().is_empty()
    }
}

/// Guided car description, rendered into a prompt by [`CarBuild::to_prompt`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarBuild {
    /// Paint color.
    pub paint: PaintColor,
    /// Body style, e.g. "Classic Muscle".
    pub body: String,
    /// Decal set; `None` for clean bodywork.
    pub decals: Option<String>,
    /// Rear spoiler, e.g. "Drag Wing".
    pub spoiler: String,
    /// Hood, e.g. "Supercharger Blower".
    pub hood: String,
}

impl Default for CarBuild {
    fn default() -> Self {
        Self {
            paint: PaintColor::Named("Red".to_owned()),
            body: "Classic Muscle".to_owned(),
            decals: Some("Dual Racing Stripes".to_owned()),
            spoiler: "Drag Wing".to_owned(),
            hood: "Supercharger Blower".to_owned(),
        }
    }
}

impl CarBuild {
    /// Render the build as subject details.
    pub fn to_prompt(&self) -> String {
        let color = match &self.paint {
            PaintColor::Named(name) => name.trim().to_lowercase(),
            PaintColor::Custom(rgb) => format!("custom {} painted", rgb.to_hex()),
        };
        let decals = match &self.decals {
            Some(d) => format!("Decorated with {} decals.", d.to_lowercase()),
            None => "Clean bodywork, no decals.".to_owned(),
        };
        [
            format!("A {color} {} drag racing car.", self.body.to_lowercase()),
            format!("Features a {} on the hood", self.hood.to_lowercase()),
            format!("and a {} on the rear.", self.spoiler.to_lowercase()),
            decals,
            "Top-down view, symmetrical, isolated on plain background.".to_owned(),
        ]
        .join(" ")
    }

    /// Make `config` a car request whose prompt is this build's description.
    pub fn apply(&self, config: &mut GenerationConfig) {
        config.asset_type = AssetType::Car;
        config.prompt = self.to_prompt();
    }
}

fn viewpoint(perspective: Perspective) -> &'static str {
    match perspective {
        Perspective::Isometric => {
            "2.5D Isometric Game View (approx 45 degrees), showing depth and side details."
        }
        _ => "STRICTLY TOP-DOWN (Bird's eye view), completely flat 2D looking down.",
    }
}

fn subject(asset_type: AssetType) -> &'static str {
    match asset_type {
        AssetType::Car => "A drag racing car. Symmetrical design.",
        AssetType::Track => "A race track segment. Asphalt texture, lane markings.",
        AssetType::Prop => "A race track prop (like a cone, tire barrier, or flag).",
        AssetType::Ui => "A user interface element for a racing game.",
    }
}

fn style_description(style: ArtStyle) -> &'static str {
    match style {
        ArtStyle::Pixel => {
            "16-bit pixel art style, crisp edges, limited color palette, retro game asset"
        }
        ArtStyle::Vector => "Clean flat vector illustration, bold lines, solid colors, svg style",
        ArtStyle::Realistic => "Photorealistic 2D render, high detail, raytraced lighting",
        ArtStyle::Sketch => "Hand drawn pencil sketch on paper, artistic, rough lines",
        ArtStyle::Blueprint => {
            "Technical blueprint schematic, white lines on blue background, engineering drawing"
        }
        ArtStyle::Neon => {
            "Cyberpunk neon aesthetics, glowing lights, dark background, synthwave style"
        }
        ArtStyle::LowPoly => "Low-poly 3D model look, faceted surfaces, flat shading",
        ArtStyle::CelShaded => "Cel-shaded cartoon, thick outlines, hard-edged shadows",
        ArtStyle::Vaporwave => "Vaporwave aesthetic, pastel pink and teal palette, retro gradients",
        ArtStyle::Watercolor => "Watercolor painting, soft washes, visible paper texture",
        ArtStyle::Oil => "Oil painting, thick brush strokes, rich saturated color",
        ArtStyle::Marker => "Alcohol marker concept drawing, bold strokes, design-sketch look",
    }
}

/// Assemble the full generator prompt.
pub fn build_prompt(config: &GenerationConfig) -> String {
    let mut details = config.prompt.trim().to_owned();
    if let Some(paint) = &config.paint {
        if !details.is_empty() {
            details.push(' ');
        }
        details.push_str(&format!("Use a {}.", paint.describe()));
    }
    format!(
        "You are an expert game artist specializing in creating 2D assets for racing games.\n\
         Create an image based on the following requirements:\n\
         1. Viewpoint: {}\n\
         2. Background: Solid plain color (white or black) ensuring easy removal. \
         Ideally isolated.\n\
         3. Subject: {}\n\
         4. Style: {}\n\
         5. Specific details: {}\n\
         \n\
         Ensure the asset is centered and fully visible within the frame.",
        viewpoint(config.perspective),
        subject(config.asset_type),
        style_description(config.style),
        details,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/generate/prompt.rs"]
mod tests;
