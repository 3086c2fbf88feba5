use std::cell::RefCell;

use super::*;
use crate::foundation::error::DraggenError;
use crate::generate::client::GeneratedImage;
use crate::library::asset::{ArtStyle, AssetType};
use crate::library::repository::{AssetRepository, MemorySlot};

struct FakeGenerator {
    reply: Result<GeneratedImage, String>,
    seen: RefCell<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    fn ok(data: &str) -> Self {
        Self {
            reply: Ok(GeneratedImage {
                mime_type: "image/png".to_owned(),
                data: data.to_owned(),
            }),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn failing(msg: &str) -> Self {
        Self {
            reply: Err(msg.to_owned()),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl ImageGenerator for FakeGenerator {
    fn generate(&self, request: &GenerationRequest) -> DraggenResult<GeneratedImage> {
        self.seen.borrow_mut().push(request.clone());
        self.reply.clone().map_err(DraggenError::generation)
    }
}

fn library() -> AssetLibrary<MemorySlot> {
    AssetLibrary::open(AssetRepository::new(MemorySlot::new()))
}

fn config(prompt: &str) -> GenerationConfig {
    GenerationConfig {
        prompt: prompt.to_owned(),
        asset_type: AssetType::Track,
        style: ArtStyle::Blueprint,
        ..GenerationConfig::default()
    }
}

#[test]
fn blank_prompt_skips_the_generator() {
    let mut lib = library();
    let generator = FakeGenerator::ok("AAEC");
    let out = generate_asset(&mut lib, &generator, &config("   "), TimestampMs(1)).unwrap();
    assert!(out.is_none());
    assert!(generator.seen.borrow().is_empty());
    assert!(lib.store().is_empty());
}

#[test]
fn successful_generation_is_prepended_and_saved() {
    let mut lib = library();
    let generator = FakeGenerator::ok("AAEC");
    let first = generate_asset(&mut lib, &generator, &config("strip"), TimestampMs(1))
        .unwrap()
        .unwrap();
    let second = generate_asset(&mut lib, &generator, &config("pit lane "), TimestampMs(2))
        .unwrap()
        .unwrap();

    let ids: Vec<_> = lib.store().iter().map(|a| a.id().clone()).collect();
    assert_eq!(ids, [second.clone(), first]);

    let newest = lib.get(&second).unwrap();
    assert_eq!(newest.prompt(), "pit lane");
    assert_eq!(newest.asset_type(), AssetType::Track);
    assert_eq!(newest.style(), ArtStyle::Blueprint);
    assert_eq!(newest.timestamp(), TimestampMs(2));
    assert_eq!(newest.image().bytes(), &[0, 1, 2]);

    let seen = generator.seen.borrow();
    assert!(seen[1].prompt.contains("5. Specific details: pit lane"));
    assert!(seen[1].prompt.contains("Technical blueprint"));

    let reloaded = AssetRepository::new(lib.repository().slot().clone()).load();
    assert_eq!(reloaded.len(), 2);
}

#[test]
fn generator_failure_leaves_library_untouched() {
    let mut lib = library();
    let generator = FakeGenerator::failing("model overloaded");
    let err = generate_asset(&mut lib, &generator, &config("car"), TimestampMs(1)).unwrap_err();
    assert!(matches!(err, DraggenError::Generation(ref m) if m.contains("overloaded")));
    assert!(lib.store().is_empty());
}

#[test]
fn empty_image_data_is_a_generation_error() {
    let mut lib = library();
    let generator = FakeGenerator::ok("");
    let err = generate_asset(&mut lib, &generator, &config("car"), TimestampMs(1)).unwrap_err();
    assert!(matches!(err, DraggenError::Generation(_)));
}
