use anyhow::Context;
use batch_sweep::{
    config::SweepConfig,
    fashion::{CLASSES, FashionMnist, Split},
    report::Reporter,
    sweep::Sweep,
};
use log::info;
use machine_learning::{
    arch::{Sequential, loss::CrossEntropy},
    optimization::GradientDescent,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = SweepConfig::default();
    info!("using cpu device");
    info!("config {}", serde_json::to_string(&config)?);

    let fashion = FashionMnist::new(&config.data_root);
    let train = fashion
        .load(Split::Train)
        .context("failed to load the training partition")?;
    let test = fashion
        .load(Split::Test)
        .context("failed to load the test partition")?;

    let rng = config.rng();
    let inputs = train.x_size();
    let lr = config.learning_rate;

    let mut sweep = Sweep::new(
        config.batch_sizes.clone(),
        config.epochs,
        || Sequential::random(config.layers(inputs, CLASSES), rng.clone()),
        |_: &Sequential| GradientDescent::new(lr),
        CrossEntropy,
    );

    let mut reporter = Reporter::create(&config.output_path)
        .with_context(|| format!("failed to create {}", config.output_path.display()))?;
    sweep.run(&train, &test, &mut reporter)?;

    println!("Done!");
    Ok(())
}
