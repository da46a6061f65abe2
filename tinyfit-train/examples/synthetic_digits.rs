//! Trains a logistic regression and a small convolutional network on
//! synthetic 28x28 "digits": one bright block per class plus Gaussian noise.
//!
//! Run with `RUST_LOG=info cargo run -p tinyfit-train --example synthetic_digits`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::error::Error;
use tinyfit_core::model::Sequential;
use tinyfit_core::nn::{accuracy, AvgPool2d, Conv2d, CrossEntropyLoss, Flatten, Lambda, Linear, Module, ReLU};
use tinyfit_core::ops::conv::Conv2dGeometry;
use tinyfit_core::optim::SgdOptimizer;
use tinyfit_core::{no_grad, Tensor, TinyfitError};
use tinyfit_data::{Batch, DataLoader, TensorDataset, WrappedDataLoader};
use tinyfit_train::{fit, EpochReport, FitConfig, Trainer};

const SIDE: usize = 28;
const PIXELS: usize = SIDE * SIDE;
const CLASSES: usize = 10;
const BATCH_SIZE: usize = 64;
const EPOCHS: usize = 2;

/// Class `c` lights a 7x7 cell of a 4x4 grid; the rest is noise.
fn synthetic_digits(n: usize, rng: &mut StdRng) -> Result<TensorDataset, TinyfitError> {
    let noise = Normal::new(0.0f32, 0.3).map_err(|e| TinyfitError::InvalidConfiguration(e.to_string()))?;
    let mut images = Vec::with_capacity(n * PIXELS);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let class = i % CLASSES;
        let (cell_y, cell_x) = (class / 4 * 7, class % 4 * 7);
        for y in 0..SIDE {
            for x in 0..SIDE {
                let lit = (cell_y..cell_y + 7).contains(&y) && (cell_x..cell_x + 7).contains(&x);
                let base = if lit { 1.0 } else { 0.0 };
                images.push(base + noise.sample(rng));
            }
        }
        labels.push(class as f32);
    }
    TensorDataset::new(Tensor::new(images, vec![n, PIXELS])?, Tensor::new(labels, vec![n])?)
}

fn print_accuracy(name: &str, model: &dyn Module, valid: &TensorDataset) -> Result<(), TinyfitError> {
    let acc = no_grad(|| accuracy(&model.forward(valid.inputs())?, valid.targets()))?;
    println!("{}: validation accuracy {:.1}%", name, acc * 100.0);
    Ok(())
}

fn cnn(rng: &mut StdRng) -> Result<Sequential, TinyfitError> {
    let down = Conv2dGeometry { stride: 2, padding: 1 };
    Ok(Sequential::from_modules(vec![
        Box::new(Lambda::view_batch(vec![1, SIDE, SIDE])),
        Box::new(Conv2d::with_rng(1, 16, 3, down, rng)?),
        Box::new(ReLU::new()),
        Box::new(Conv2d::with_rng(16, 16, 3, down, rng)?),
        Box::new(ReLU::new()),
        Box::new(Conv2d::with_rng(16, CLASSES, 3, down, rng)?),
        Box::new(ReLU::new()),
        Box::new(AvgPool2d::new(4)),
        Box::new(Flatten::new()),
    ]))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let mut rng = StdRng::seed_from_u64(42);
    let train_set = synthetic_digits(1000, &mut rng)?;
    let valid_set = synthetic_digits(200, &mut rng)?;
    let loss_fn = CrossEntropyLoss::new();

    let train = DataLoader::for_tensors(train_set.clone(), BATCH_SIZE, true)?;
    let valid = DataLoader::for_tensors(valid_set.clone(), BATCH_SIZE * 2, false)?;

    // Logistic regression on flat pixels.
    let mut logistic = Linear::with_rng(PIXELS, CLASSES, true, &mut rng)?;
    let mut opt = SgdOptimizer::new(logistic.parameters().into_iter().cloned(), 0.5, 0.0, 0.0, false)?;
    let history = fit(EPOCHS, &mut logistic, &loss_fn, &mut opt, &train, &valid)?;
    println!("logistic: validation losses {:?}", history.valid_losses());
    print_accuracy("logistic", &logistic, &valid_set)?;

    // Convolutional model; its leading view turns flat rows into images.
    let mut model = cnn(&mut rng)?;
    let mut opt = SgdOptimizer::new(model.parameters().into_iter().cloned(), 0.1, 0.9, 0.0, false)?;
    let history = fit(EPOCHS, &mut model, &loss_fn, &mut opt, &train, &valid)?;
    println!("cnn: validation losses {:?}", history.valid_losses());
    print_accuracy("cnn", &model, &valid_set)?;

    // Same architecture fed pre-shaped batches, so the view is a no-op.
    let to_images = |b: Batch| -> Result<Batch, TinyfitError> {
        Ok(Batch::new(b.inputs.view_batch(&[1, SIDE, SIDE])?, b.targets))
    };
    let train = WrappedDataLoader::new(train, to_images);
    let valid = WrappedDataLoader::new(valid, to_images);
    let mut model = cnn(&mut rng)?;
    let mut opt = SgdOptimizer::new(model.parameters().into_iter().cloned(), 0.1, 0.9, 0.0, false)?;
    let mut trainer = Trainer::new(FitConfig::new(EPOCHS).allow_fallback(true))
        .with_reporter(|r: &EpochReport| println!("wrapped cnn, epoch {}: {:.4}", r.epoch, r.valid_loss));
    trainer.fit(&mut model, &loss_fn, &mut opt, &train, &valid)?;
    Ok(())
}
