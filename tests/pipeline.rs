//! End-to-end adapter chains through the public API.

use zenadapt::{
    AdapterError, BernsenThreshold, Cast, Crop, Flip, FlipMode, Gray, ImgVec, NearestResize,
    NearestRotate, PixelAdapter, RangesThreshold, Raster, RenderJob, Rgb, Rgba,
};

fn columns() -> ImgVec<Gray<u8>> {
    let row = [0u8, 85, 170, 255].map(Gray::new);
    ImgVec::new(row.repeat(4), 4, 4)
}

fn read_all<A: PixelAdapter<Gray<u8>>>(adapter: &mut A) -> Vec<u8> {
    let mut out = Vec::new();
    for y in 0..adapter.y_len() as i32 {
        adapter.move_to(0, y);
        for _ in 0..adapter.x_len() {
            out.push(adapter.r());
            adapter.move_next_x();
        }
    }
    out
}

#[test]
fn inner_crop_row_major() {
    let img = columns();
    let mut crop = Crop::from_image(img.as_ref(), 1, 1, 2, 2);
    assert_eq!(read_all(&mut crop), [85, 170, 85, 170]);
}

#[test]
fn boxed_chain_composes_dynamically() {
    let img = columns();
    let mut chain: Box<dyn PixelAdapter<Gray<u8>> + '_> = Box::new(img.as_ref().adapter(0, 0));
    chain = Box::new(Flip::new(chain, FlipMode::Horizontal));
    chain = Box::new(Crop::new(chain, 0, 0, 2, 1));
    chain = Box::new(RangesThreshold::new(chain, &[200, 255]).unwrap());
    assert_eq!(read_all(&mut chain), [255, 0]);
}

#[test]
fn borrowed_inner_adapter_survives() {
    let img = columns();
    let mut src = img.as_ref().adapter(0, 0);
    {
        let mut resize = NearestResize::new(&mut src, 2, 2).unwrap();
        assert_eq!(read_all(&mut resize), [0, 170, 0, 170]);
    }
    // The caller's view is still usable after the composite is gone.
    src.move_to(3, 3);
    assert_eq!(src.r(), 255);
}

#[test]
fn flip_then_rotate_half_turn_is_identity() {
    let img = ImgVec::new((0..12u8).map(Gray::new).collect(), 4, 3);
    let flipped = Flip::from_image(img.as_ref(), FlipMode::Both);
    let mut rotated = NearestRotate::new(flipped, 180.0).unwrap();
    let expected: Vec<u8> = (0..12).collect();
    assert_eq!(read_all(&mut rotated), expected);
}

#[test]
fn cast_feeds_threshold_and_writes_back() {
    let img = ImgVec::new(
        vec![Rgb { r: 255u8, g: 255, b: 255 }, Rgb { r: 10, g: 10, b: 10 }],
        2,
        1,
    );
    let gray: Cast<Rgb<u8>, Gray<u8>, _> = Cast::from_image(img.as_ref());
    let mut bernsen = BernsenThreshold::new(gray, 1);
    let out: ImgVec<Gray<u8>> = RenderJob::new().render_to_vec(&mut bernsen).unwrap();
    assert_eq!(out.buf(), &[Gray::new(255), Gray::new(0)]);

    let mut dst = ImgVec::new(vec![Rgb { r: 0u8, g: 0, b: 0 }; 2], 2, 1);
    {
        let mut flip = Flip::new(dst.as_mut().adapter(0, 0), FlipMode::Horizontal);
        flip.override_with(Rgba { r: 9, g: 8, b: 7, a: 255 }).unwrap();
    }
    assert_eq!(dst.buf()[1], Rgb { r: 9, g: 8, b: 7 });
}

#[test]
fn read_only_chain_reports_adapter() {
    let img = columns();
    let crop = Crop::from_image(img.as_ref(), 0, 0, 2, 2);
    let mut resize = NearestResize::new(crop, 4, 4).unwrap();
    let err = resize
        .overlay_with(Rgba { r: 0, g: 0, b: 0, a: 128 })
        .unwrap_err();
    assert_eq!(err.to_string(), "NearestResize does not support overlay");

    let mut crop = Crop::from_image(img.as_ref(), 0, 0, 2, 2);
    assert_eq!(
        crop.override_with(Rgba { r: 0, g: 0, b: 0, a: 255 }),
        Err(AdapterError::ReadOnlyImage)
    );
}
