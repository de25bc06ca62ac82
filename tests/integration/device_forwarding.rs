use pdxanon::device::IMAGE_MASK_VALUE;
use pdxanon::{AnonymizerConfig, AnonymizingDevice, DrawOp, PageDump, PolicyFilter, RecordingSink};

use crate::fixtures::{engine, graphics_ops, image};

fn graphics_dump() -> PageDump {
    PageDump {
        width: 612.0,
        height: 792.0,
        fonts: Vec::new(),
        ops: graphics_ops(),
    }
}

fn replay(mask_images: bool) -> (Vec<DrawOp>, Vec<DrawOp>) {
    let dump = graphics_dump();
    let config = AnonymizerConfig {
        mask_images,
        ..AnonymizerConfig::default()
    };
    let resolution = config.resolution;

    let mut direct = RecordingSink::new();
    dump.replay(&mut direct, resolution).unwrap();

    let mut device = AnonymizingDevice::new(RecordingSink::new(), engine(config, PolicyFilter::default(), 0));
    dump.replay(&mut device, resolution).unwrap();
    let (sink, _) = device.into_parts();

    (direct.into_ops(), sink.into_ops())
}

fn images(ops: &[DrawOp]) -> Vec<&pdxanon::device::Image> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::FillImage { image, .. }
            | DrawOp::FillImageMask { image, .. }
            | DrawOp::ClipImageMask { image, .. } => Some(image),
            _ => None,
        })
        .collect()
}

#[test]
fn test_non_text_calls_forwarded_verbatim() {
    let (direct, anonymized) = replay(false);
    assert_eq!(direct.len(), graphics_ops().len());
    assert_eq!(direct, anonymized);
}

#[test]
fn test_masking_blanks_all_three_image_calls() {
    let (direct, masked) = replay(true);
    assert_eq!(direct.len(), masked.len());

    let originals = images(&direct);
    let blanked = images(&masked);
    assert_eq!(blanked.len(), 3);
    for (original, blank) in originals.iter().zip(&blanked) {
        assert_eq!(blank.width, original.width);
        assert_eq!(blank.height, original.height);
        assert_eq!(blank.samples.len(), image().samples.len());
        assert!(blank.samples.iter().all(|s| *s == IMAGE_MASK_VALUE));
    }

    // everything else is untouched
    let rest = |ops: &[DrawOp]| -> Vec<&'static str> { ops.iter().map(DrawOp::name).collect() };
    assert_eq!(rest(&direct), rest(&masked));
}
