//! End-to-end `/image` invocations against a recording platform and mocked image runtime

use assert_matches::assert_matches;
use chanakya::commands::ai::image::{IMAGE_FILENAME, ImageSettings, handle_image};
use chanakya::delivery::IMAGE_MARKER;
use chanakya::error::{DeliveryError, GenerationError, InvocationError};
use mockall::Sequence;
use pretty_assertions::assert_eq;

use crate::common::fixtures::PNG_MAGIC;
use crate::common::mocks::{MockImages, RecordingPlatform, Sent};
use crate::common::sample_addressing;

fn caption() -> String {
    "🎨 <@123456789> Here is your generated image!".to_string()
}

#[tokio::test]
async fn test_cache_is_cleared_before_generating() {
    let platform = RecordingPlatform::new();
    let mut images = MockImages::new();
    let mut seq = Sequence::new();
    images
        .expect_clear_memory_cache()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    images
        .expect_generate()
        .withf(|prompt| prompt == "a lighthouse at dusk")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(PNG_MAGIC.to_vec()));

    let result = handle_image(
        &platform,
        &images,
        &ImageSettings::default(),
        &sample_addressing(IMAGE_MARKER),
        "a lighthouse at dusk",
    )
    .await;

    assert_eq!(result, Ok(()));
    assert_eq!(
        platform.events(),
        vec![
            Sent::Deferred,
            Sent::File {
                text: caption(),
                filename: IMAGE_FILENAME.to_string(),
                bytes: PNG_MAGIC.to_vec(),
            },
        ]
    );
}

#[tokio::test]
async fn test_cache_clear_failure_does_not_block_generation() {
    let platform = RecordingPlatform::new();
    let mut images = MockImages::new();
    images.expect_clear_memory_cache().returning(|| {
        Err(GenerationError::Image {
            diagnostic: "404 Not Found".to_string(),
        })
    });
    images
        .expect_generate()
        .times(1)
        .returning(|_| Ok(PNG_MAGIC.to_vec()));

    let result = handle_image(
        &platform,
        &images,
        &ImageSettings::default(),
        &sample_addressing(IMAGE_MARKER),
        "a cat",
    )
    .await;

    assert_eq!(result, Ok(()));
    assert_matches!(platform.events().last(), Some(Sent::File { .. }));
}

#[tokio::test]
async fn test_generation_failure_is_reported() {
    let platform = RecordingPlatform::new();
    let mut images = MockImages::new();
    images.expect_clear_memory_cache().returning(|| Ok(()));
    images.expect_generate().returning(|_| {
        Err(GenerationError::Image {
            diagnostic: "CUDA out of memory".to_string(),
        })
    });

    let result = handle_image(
        &platform,
        &images,
        &ImageSettings::default(),
        &sample_addressing(IMAGE_MARKER),
        "a very large mural",
    )
    .await;

    assert_matches!(result, Err(InvocationError::Generation(_)));
    assert_eq!(
        platform.events(),
        vec![
            Sent::Deferred,
            Sent::Followup("❌ An error occurred: CUDA out of memory".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_rejected_attachment_is_reported() {
    let platform = RecordingPlatform::new().with_failing_file();
    let mut images = MockImages::new();
    images.expect_clear_memory_cache().returning(|| Ok(()));
    images
        .expect_generate()
        .returning(|_| Ok(PNG_MAGIC.to_vec()));

    let result = handle_image(
        &platform,
        &images,
        &ImageSettings::default(),
        &sample_addressing(IMAGE_MARKER),
        "a tiny icon",
    )
    .await;

    assert_matches!(
        result,
        Err(InvocationError::Delivery(DeliveryError::Followup { .. }))
    );
    assert_eq!(
        platform.events(),
        vec![
            Sent::Deferred,
            Sent::Followup("❌ An error occurred: Request entity too large".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_rejected_defer_is_reported_without_generating() {
    let platform = RecordingPlatform::new().with_failing_defer();
    let mut images = MockImages::new();
    images.expect_clear_memory_cache().never();
    images.expect_generate().never();

    let result = handle_image(
        &platform,
        &images,
        &ImageSettings::default(),
        &sample_addressing(IMAGE_MARKER),
        "a lighthouse at dusk",
    )
    .await;

    assert_matches!(
        result,
        Err(InvocationError::Delivery(DeliveryError::Acknowledge { .. }))
    );
    assert_eq!(
        platform.events(),
        vec![Sent::Followup(
            "❌ An error occurred: Unknown interaction".to_string()
        )]
    );
}
