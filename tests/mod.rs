use nalgebra::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use approx::assert_relative_eq;
use facefeat::*;
use facefeat::feature::*;
use facefeat::feature::basis;
use facefeat::feature::lbp;

const EPS : f64 = 10E-8;

fn clusters(rng : &mut StdRng, centers : &[(f64, f64)], n : usize, sd : f64) -> (DMatrix<f64>, Vec<i32>) {
    let noise = Normal::new(0.0, sd).unwrap();
    let mut data = DMatrix::zeros(centers.len() * n, 2);
    let mut labels = Vec::new();
    for (c, (x, y)) in centers.iter().enumerate() {
        for k in 0..n {
            let i = c * n + k;
            data[(i, 0)] = x + noise.sample(rng);
            data[(i, 1)] = y + noise.sample(rng);
            labels.push(c as i32 * 5 + 1);
        }
    }
    (data, labels)
}

fn cosine(a : &DVector<f64>, b : &DVector<f64>) -> f64 {
    a.dot(b).abs() / (a.norm() * b.norm())
}

#[test]
fn original_lbp_hand_computed() -> anyhow::Result<()> {
    let img : GrayImage = Image::from_row_slice(4, 4, &[
        5u8, 9, 1, 3,
        4, 6, 7, 2,
        8, 6, 3, 9,
        1, 2, 5, 4
    ]).into();
    match lbp::Operator::Original.apply(&img)? {
        DescriptorMap::Codes8(codes) => {
            assert_eq!(codes.shape(), (2, 2));
            assert_eq!(codes.get(0, 0), 0b0101_0110);
            assert_eq!(codes.get(0, 1), 0b1000_1000);
            assert_eq!(codes.get(1, 0), 0b0110_0001);
            assert_eq!(codes.get(1, 1), 0b1101_1101);
        },
        other => panic!("Unexpected descriptor map {:?}", other)
    }
    Ok(())
}

#[test]
fn descriptors_for_every_supported_type() -> anyhow::Result<()> {
    let imgs : Vec<GrayImage> = vec![
        Image::new_constant(7, 9, 3u8).into(),
        Image::new_constant(7, 9, -3i8).into(),
        Image::new_constant(7, 9, 300u16).into(),
        Image::new_constant(7, 9, -300i16).into(),
        Image::new_constant(7, 9, 70_000u32).into(),
        Image::new_constant(7, 9, -70_000i32).into(),
        Image::new_constant(7, 9, 0.25f32).into(),
        Image::new_constant(7, 9, 1E3f64).into()
    ];
    for img in imgs.iter() {
        assert!(lbp::supports(img.element_type()));
        assert_eq!(lbp::olbp_any(img)?.shape(), (5, 7));
        assert_eq!(lbp::elbp_any(img, 2, 8)?.shape(), (3, 5));
        let energy = lbp::varlbp_any(img, 3, 8)?;
        assert_eq!(energy.shape(), (1, 3));
        assert!(energy.row_major().iter().all(|v| v.abs() < EPS ));
    }
    let wide : GrayImage = Image::new_constant(7, 9, 3i64).into();
    assert!(matches!(lbp::elbp_any(&wide, 1, 8), Err(Error::UnsupportedElementType { .. })));
    Ok(())
}

#[test]
fn variance_ignores_intensity_offset() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let base = Image::from_fn(16, 16, |_, _| rng.gen_range(0.0..100.0f64));
    let shifted = Image::from_fn(16, 16, |i, j| base.get(i, j) - 55.5);
    let a = lbp::varlbp(&base, 2, 12)?;
    let b = lbp::varlbp(&shifted, 2, 12)?;
    assert_eq!(a.shape(), (12, 12));
    let (a, b) : (&DMatrix<f64>, &DMatrix<f64>) = (a.as_ref(), b.as_ref());
    assert_relative_eq!(*a, *b, epsilon = 1E-8, max_relative = 1E-9);
    Ok(())
}

#[test]
fn pipeline_histograms() -> anyhow::Result<()> {
    let ex = Extractor::new(
        Operator::Original,
        HistogramConfig { num_patterns : None, grid_x : 3, grid_y : 2, normed : true }
    );
    let stripes : GrayImage = Image::from_fn(20, 26, |i, _| if i % 4 < 2 { 10u8 } else { 200u8 }).into();
    let columns : GrayImage = Image::from_fn(20, 26, |_, j| if j % 4 < 2 { 10u8 } else { 200u8 }).into();
    let feats = ex.extract_all(&[stripes, columns])?;
    assert_eq!(feats.shape(), (2, 3 * 2 * 256));
    for r in 0..2 {
        for cell in 0..6 {
            let s : f64 = feats.row(r).columns(cell * 256, 256).sum();
            assert_relative_eq!(s, 1.0, epsilon = EPS);
        }
    }
    assert!(feats.row(0) != feats.row(1));
    Ok(())
}

#[test]
fn projection_round_trip() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(11);
    let q = DMatrix::from_fn(4, 4, |_, _| rng.gen::<f64>() ).qr().q();
    let mean = DVector::from_fn(4, |i, _| i as f64 );
    let x = DMatrix::from_fn(6, 4, |_, _| rng.gen_range(-5.0..5.0) );
    let y = basis::project(&q, &mean, &x)?;
    let back = basis::reconstruct(&q, &mean, &y)?;
    assert_relative_eq!(back, x, epsilon = 1E-9);
    Ok(())
}

#[test]
fn lda_separates_two_clusters() -> anyhow::Result<()> {
    let data = DMatrix::from_row_slice(8, 2, &[
        1.1, 0.1,
        0.9, -0.1,
        1.1, -0.1,
        0.9, 0.1,
        -0.9, 0.1,
        -1.1, -0.1,
        -0.9, -0.1,
        -1.1, 0.1
    ]);
    let labels = [0, 0, 0, 0, 1, 1, 1, 1];
    let lda = LDA::fit(&data, &labels, 1, true)?;
    let w = lda.eigenvectors()?;
    assert_eq!(w.shape(), (2, 1));
    let axis = w.column(0).into_owned();
    assert_relative_eq!(cosine(&axis, &DVector::from_vec(vec![1., 0.])), 1.0, epsilon = 1E-9);
    // Sb = d d^T / 2 with d = (2, 0) and Sw = 0.08 I.
    assert_relative_eq!(lda.eigenvalues()?[0], 25.0, epsilon = 1E-8);
    let proj = lda.project(&data)?;
    assert!(proj[(0, 0)] * proj[(4, 0)] < 0.0);
    Ok(())
}

#[test]
fn lda_direction_on_noisy_clusters() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(2021);
    let (data, labels) = clusters(&mut rng, &[(1.0, 0.0), (-1.0, 0.0)], 200, 0.2);
    let lda = LDA::fit(&data, &labels, 0, true)?;
    let axis = lda.eigenvectors()?.column(0).into_owned();

    // Closed-form two-class Fisher direction, Sw^-1 (mu_0 - mu_1).
    let mu0 = data.rows(0, 200).row_mean().transpose();
    let mu1 = data.rows(200, 200).row_mean().transpose();
    let mut centered = data.clone();
    for i in 0..400 {
        let mu = if i < 200 { &mu0 } else { &mu1 };
        for j in 0..2 {
            centered[(i, j)] -= mu[j];
        }
    }
    let sw = centered.tr_mul(&centered);
    let fisher = sw.try_inverse().unwrap() * (&mu0 - &mu1);
    assert_relative_eq!(cosine(&axis, &fisher), 1.0, epsilon = 1E-6);
    assert!(cosine(&axis, &DVector::from_vec(vec![1., 0.])) > 0.98);
    Ok(())
}

#[test]
fn lda_column_orientation_matches_rows() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(5);
    let (data, labels) = clusters(&mut rng, &[(0.0, 3.0), (2.0, -1.0), (-3.0, 0.5)], 30, 0.5);
    let by_row = LDA::fit(&data, &labels, 0, true)?;
    let by_col = LDA::fit(&data.transpose(), &labels, 0, false)?;
    assert_relative_eq!(*by_row.eigenvalues()?, *by_col.eigenvalues()?, epsilon = 1E-8);
    for k in 0..2 {
        let a = by_row.eigenvectors()?.column(k).into_owned();
        let b = by_col.eigenvectors()?.column(k).into_owned();
        assert_relative_eq!(cosine(&a, &b), 1.0, epsilon = 1E-8);
    }
    let pr = by_row.project(&data)?;
    let pc = by_col.project(&data.transpose())?;
    assert_eq!(pr.shape(), (90, 2));
    assert_eq!(pc.shape(), (90, 2));
    Ok(())
}

#[test]
fn lda_over_images() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(99);
    let noise = Normal::new(0.0, 2.0f32).unwrap();
    let patterns : [[f32; 9]; 3] = [
        [50., 0., 0., 0., 50., 0., 0., 0., 50.],
        [0., 0., 50., 0., 50., 0., 50., 0., 0.],
        [0., 50., 0., 50., 0., 50., 0., 50., 0.]
    ];
    let mut imgs = Vec::new();
    let mut labels = Vec::new();
    for (c, p) in patterns.iter().enumerate() {
        for _ in 0..12 {
            let px : Vec<f32> = p.iter().map(|v| v + noise.sample(&mut rng) ).collect();
            imgs.push(GrayImage::from(Image::from_row_slice(3, 3, &px[..])));
            labels.push(100 - c as i32);
        }
    }
    let mut lda = LDA::new(0, true);
    lda.compute_images(&imgs, &labels)?;
    assert_eq!(lda.num_components()?, 2);
    let data = DMatrix::from_fn(imgs.len(), 9, |i, j| imgs[i].to_row_major_f64()[j] );
    let proj = lda.project(&data)?;

    // Nearest projected class mean recovers every training label.
    let means : Vec<RowDVector<f64>> = (0..3).map(|c| proj.rows(c * 12, 12).row_mean() ).collect();
    for i in 0..imgs.len() {
        let nearest = (0..3)
            .min_by(|a, b| {
                let da = (proj.row(i) - &means[*a]).norm();
                let db = (proj.row(i) - &means[*b]).norm();
                da.partial_cmp(&db).unwrap()
            })
            .unwrap();
        assert_eq!(nearest, i / 12);
    }

    let mixed = vec![imgs[0].clone(), GrayImage::from(Image::new_constant(2, 2, 0.0f32))];
    assert!(matches!(lda.compute_images(&mixed, &[0, 1]), Err(Error::Argument(_))));
    Ok(())
}

#[test]
fn lda_rejects_mismatched_labels() {
    let data = DMatrix::<f64>::zeros(5, 2);
    let mut lda = LDA::new(0, true);
    assert!(matches!(lda.compute(&data, &[0, 1, 0]), Err(Error::Argument(_))));
}

#[test]
fn lda_rejects_fewer_samples_than_features() {
    let mut rng = StdRng::seed_from_u64(31);
    let noise = Normal::new(0.0, 1.0).unwrap();
    for _ in 0..20 {
        let data = DMatrix::from_fn(6, 10, |_, _| noise.sample(&mut rng) );
        let mut lda = LDA::new(0, true);
        assert!(matches!(lda.compute(&data, &[0, 0, 1, 1, 2, 2]), Err(Error::SingularMatrix)));
        assert!(!lda.is_computed());
    }
}

#[test]
fn config_drives_pipeline() -> anyhow::Result<()> {
    let src = r#"{
        "operator" : { "kind" : "extended", "radius" : 1, "neighbors" : 4 },
        "histogram" : { "grid_x" : 2, "grid_y" : 2, "normed" : false },
        "lda" : { "num_components" : 1 }
    }"#;
    let config = Config::load(src.as_bytes())?;
    let ex = Extractor::from_config(&config);
    assert_eq!(ex.feature_len()?, 2 * 2 * 16);
    let img : GrayImage = Image::from_fn(10, 10, |i, j| ((i * 3 + j) % 7) as u16).into();
    let v = ex.extract(&img)?;
    // Unnormalized cells of 4x4 pixels.
    assert_relative_eq!(v.sum(), 4.0 * 16.0);
    let lda = LDA::from_config(config.lda);
    assert!(lda.config().data_as_row);
    assert!(!lda.is_computed());
    Ok(())
}
