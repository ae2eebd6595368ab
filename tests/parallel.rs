//! Clone-per-worker scanning must match a single sequential scan.

use rayon::prelude::*;
use zenadapt::{
    AdjustContrast, BilinearRotate, BoxFilter, Crop, Filter, Gray, ImgVec, MedianThreshold,
    PixelAdapter, PixelFormat, RenderJob, Rgb,
};

fn gradient(w: usize, h: usize) -> ImgVec<Rgb<u8>> {
    let buf = (0..w * h)
        .map(|i| {
            let (x, y) = (i % w, i / w);
            Rgb {
                r: (x * 255 / w) as u8,
                g: (y * 255 / h) as u8,
                b: ((x * y) % 256) as u8,
            }
        })
        .collect();
    ImgVec::new(buf, w, h)
}

fn scan_rows_parallel<P, A>(chain: &A) -> Vec<Gray<u8>>
where
    P: PixelFormat,
    A: PixelAdapter<P> + Clone + Send + Sync,
{
    let width = chain.x_len() as usize;
    let mut out = vec![Gray::new(0u8); width * chain.y_len() as usize];
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let mut worker = chain.clone();
            worker.move_to(0, y as i32);
            for px in row.iter_mut() {
                worker.override_to(px);
                worker.move_next_x();
            }
        });
    out
}

#[test]
fn rotated_threshold_rows_match() {
    let img = gradient(48, 32);
    let crop = Crop::from_image(img.as_ref(), 4, 2, 40, 28);
    let rotate = BilinearRotate::new(crop, 17.0).unwrap();
    let mut chain = MedianThreshold::new(rotate, 2);

    let sequential: ImgVec<Gray<u8>> = RenderJob::new().render_to_vec(&mut chain).unwrap();
    let parallel = scan_rows_parallel(&chain);
    assert_eq!(sequential.buf(), &parallel);
}

#[test]
fn filtered_contrast_rows_match() {
    let img = gradient(37, 23);
    let contrast = AdjustContrast::from_image(img.as_ref(), 1.4).unwrap();
    let mut chain = Filter::new(contrast, BoxFilter::new(2)).unwrap();

    let sequential: ImgVec<Gray<u8>> = RenderJob::new().render_to_vec(&mut chain).unwrap();
    let parallel = scan_rows_parallel(&chain);
    assert_eq!(sequential.buf(), &parallel);
}
