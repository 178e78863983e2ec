use argh::FromArgs;
use faer::Mat;

use procrustes_align::{procrustes, transform_points, ProcrustesParams, ProcrustesResult};

#[derive(FromArgs)]
/// Example of similarity alignment between two synthetic point clouds
struct Args {
    /// number of points to generate
    #[argh(option, default = "100")]
    num_points: usize,

    /// rotation angle around the z axis in radians
    #[argh(option, default = "0.5")]
    angle: f64,

    /// isotropic scale applied to the source cloud
    #[argh(option, default = "1.5")]
    scale: f64,

    /// estimate the scale factor instead of assuming a rigid transform
    #[argh(switch)]
    include_scaling: bool,

    /// allow the fitted orthogonal matrix to be a reflection
    #[argh(switch)]
    include_reflections: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    // random source cloud in the unit cube
    let source = Mat::from_fn(args.num_points, 3, |_, _| rand::random::<f64>());
    println!("Source cloud: #{} points", source.nrows());

    // ground-truth similarity transform applied row-wise
    let truth = ProcrustesResult {
        scale: if args.include_scaling { args.scale } else { 1.0 },
        rotation: faer::mat![
            [args.angle.cos(), args.angle.sin(), 0.0],
            [-args.angle.sin(), args.angle.cos(), 0.0],
            [0.0, 0.0, 1.0]
        ],
        translation: faer::col![0.7, -0.3, 1.2],
    };
    let target = transform_points(source.as_ref(), &truth)?;

    let params = ProcrustesParams {
        include_scaling: args.include_scaling,
        include_reflections: args.include_reflections,
    };
    let result = procrustes(source.as_ref(), target.as_ref(), &params)?;

    log::debug!("fitted rotation: {:?}", result.rotation);

    println!("Fitted scale: {} (expected {})", result.scale, truth.scale);
    println!(
        "Fitted translation: [{:.4}, {:.4}, {:.4}] (expected [0.7000, -0.3000, 1.2000])",
        result.translation.read(0),
        result.translation.read(1),
        result.translation.read(2)
    );

    // residual between the aligned source and the target
    let fitted = transform_points(source.as_ref(), &result)?;
    let mut rmse = 0.0;
    for i in 0..fitted.nrows() {
        for j in 0..fitted.ncols() {
            let diff = fitted.read(i, j) - target.read(i, j);
            rmse += diff * diff;
        }
    }
    rmse = (rmse / fitted.nrows() as f64).sqrt();
    println!("Alignment RMSE: {:e}", rmse);

    Ok(())
}
