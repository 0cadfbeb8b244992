//! crates/prompt_studio_core/src/catalog.rs
//!
//! The static style-preset catalog and the quick-prompt library.
//! Pure data, read-only at runtime.

use crate::domain::{QuickPrompt, StylePreset};

/// Every style preset known to the application, in display order.
/// The trailing `none` entry disables style biasing.
pub const STYLE_PRESETS: &[StylePreset] = &[
    StylePreset {
        id: "infographic",
        label: "Infographic",
        modifier: "clean vector graphics, flat design, data visualization style, professional layout, white background, high legibility, corporate aesthetic",
    },
    StylePreset {
        id: "photographic",
        label: "Photographic",
        modifier: "photorealistic, 8k uhd, dslr, soft lighting, high quality, film grain, Fujifilm XT3",
    },
    StylePreset {
        id: "advertisement",
        label: "Advertisement",
        modifier: "professional advertising, commercial photography, studio lighting, high contrast, persuasive visual, marketing campaign style, award-winning ad",
    },
    StylePreset {
        id: "social-media",
        label: "Social Media",
        modifier: "trending on instagram, lifestyle photography, authentic feel, warm filter, engaging composition, viral aesthetic, high resolution",
    },
    StylePreset {
        id: "product-shot",
        label: "Product Shot",
        modifier: "professional product photography, studio lighting, 4k, macro lens, sharp focus, commercial quality, clean background, luxury aesthetic",
    },
    StylePreset {
        id: "cinematic",
        label: "Cinematic",
        modifier: "cinematic lighting, movie still, color graded, anamorphic lens, dramatic atmosphere, shallow depth of field, volumetric lighting, epic composition",
    },
    StylePreset {
        id: "digital-art",
        label: "Digital Art",
        modifier: "digital painting, concept art, highly detailed, sharp focus, trending on artstation, unreal engine 5 render, vibrant colors",
    },
    StylePreset {
        id: "3d-model",
        label: "3D Model",
        modifier: "3d render, octane render, blender, high poly, physically based rendering, studio lighting, clay render style, isometric view",
    },
    StylePreset {
        id: "anime",
        label: "Anime",
        modifier: "anime style, studio ghibli inspired, vibrant colors, cel shaded, detailed background, emotional expression, high quality illustration",
    },
    StylePreset {
        id: "none",
        label: "None",
        modifier: "",
    },
];

/// Looks up a style preset by id.
pub fn find_style_preset(id: &str) -> Option<&'static StylePreset> {
    STYLE_PRESETS.iter().find(|preset| preset.id == id)
}

/// Ready-made prompts offered to the user as starting points. Each carries a
/// complete example prompt and, where it makes sense, a `{{Placeholder}}`
/// template for extraction-style analysis plus a matching style preset.
pub const QUICK_PROMPTS: &[QuickPrompt] = &[
    QuickPrompt {
        label: "Infographic (Corporate)",
        prompt: "A professional, data-driven infographic explaining 'Digital Transformation'. Layout: Clean, grid-based structure with distinct sections. Visuals: Minimalist flat icons, sleek bar charts for revenue growth, and a process flow diagram. Color Palette: Corporate cool tones (Navy Blue, Slate Grey, White) with an Emerald Green accent. Style: Modern, vector art, high legibility, suitable for an executive presentation.",
        template: Some("A professional, data-driven infographic explaining '{{Topic}}'. Layout: Clean, grid-based structure with distinct sections. Visuals: {{Visuals}}. Color Palette: {{Color Palette}}. Style: Modern, vector art, high legibility, suitable for an executive presentation."),
        style_preset: Some("infographic"),
    },
    QuickPrompt {
        label: "Infographic (Hand Drawn)",
        prompt: "A charming, hand-drawn style infographic about 'Sustainable Living'. Aesthetic: Organic, sketchy lines with watercolor textures on a paper background. Visuals: Doodle-style illustrations of plants, recycling bins, and bicycles. Typography: Friendly, handwritten font. Color Palette: Earthy tones (Sage Green, Terracotta, Cream). Layout: Playful and flowing, guiding the eye naturally like a story.",
        template: Some("A charming, hand-drawn style infographic about '{{Topic}}'. Aesthetic: Organic, sketchy lines with watercolor textures on a paper background. Visuals: {{Visuals}}. Typography: Friendly, handwritten font. Color Palette: {{Color Palette}}. Layout: Playful and flowing, guiding the eye naturally like a story."),
        style_preset: Some("infographic"),
    },
    QuickPrompt {
        label: "Campaign Launch",
        prompt: "A photorealistic wide shot of a futuristic electric vehicle speeding through a rainy Tokyo street at night. Neon signs reflect on the wet asphalt. Cinematic lighting, motion blur on the background, sharp focus on the car. 8k resolution, commercial car photography style.",
        template: Some("A photorealistic wide shot of {{Product}} speeding through {{Setting}} at {{Time of Day}}. {{Lighting}} lighting, motion blur on the background, sharp focus on the subject. 8k resolution, commercial photography style."),
        style_preset: Some("advertisement"),
    },
    QuickPrompt {
        label: "Product Hero",
        prompt: "A professional product shot of a luxury perfume bottle on a marble podium. Lighting: Soft studio lighting with a rim light to accentuate the glass curves. Background: minimal pastel pink. Water droplets on the bottle for freshness. 8k resolution, macro photography, sharp details, commercial advertisement standard.",
        template: Some("A professional product shot of {{Product}} on a {{Surface}}. Lighting: {{Lighting}} to accentuate the details. Background: {{Background}}. {{Details}}. 8k resolution, macro photography, sharp details, commercial advertisement standard."),
        style_preset: Some("product-shot"),
    },
    QuickPrompt {
        label: "Real Estate Showcase",
        prompt: "A stunning contemporary architectural masterpiece, clean lines, floor-to-ceiling glass, nestled in a pristine natural landscape at twilight. Infinity pool reflecting a vibrant sunset. Interior visible through glass showing a spacious luxury living room with designer furniture. 8k resolution, photorealistic, architectural digest style, dramatic lighting.",
        template: Some("A stunning {{Architecture Style}} masterpiece, {{Architectural Details}}, nestled in {{Landscape}} at {{Time of Day}}. {{Features}}. Interior visible through glass showing {{Interior Details}}. 8k resolution, photorealistic, architectural digest style, dramatic lighting."),
        style_preset: Some("photographic"),
    },
    QuickPrompt {
        label: "Lifestyle Campaign",
        prompt: "A cohesive set of lifestyle images for a premium activewear brand. Subject: A diverse group of friends hiking on a scenic mountain trail during golden hour. Lighting: Warm, natural backlighting with lens flare. Style: Authentic, candid, high energy, cinematic color grading. Shot on 35mm lens, f/1.4. High-resolution, commercial advertising aesthetic.",
        template: Some("A cohesive set of lifestyle images for {{Brand/Product}}. Subject: {{Subject}} doing {{Activity}} in {{Setting}} during {{Time of Day}}. Lighting: {{Lighting}}. Style: Authentic, candid, high energy, cinematic color grading. Shot on 35mm lens, f/1.4. High-resolution, commercial advertising aesthetic."),
        style_preset: Some("social-media"),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_style_preset_returns_known_ids() {
        let preset = find_style_preset("cinematic").unwrap();
        assert_eq!(preset.label, "Cinematic");
        assert!(preset.modifier.contains("cinematic lighting"));
        assert!(find_style_preset("vaporwave").is_none());
    }

    #[test]
    fn none_preset_has_empty_modifier() {
        assert_eq!(find_style_preset("none").unwrap().modifier, "");
    }

    #[test]
    fn quick_prompt_presets_exist_in_catalog() {
        for quick in QUICK_PROMPTS {
            if let Some(id) = quick.style_preset {
                assert!(
                    find_style_preset(id).is_some(),
                    "quick prompt '{}' references unknown preset '{}'",
                    quick.label,
                    id
                );
            }
        }
    }
}
