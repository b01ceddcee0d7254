//! Command line demonstration of the S- and T-learners.

// cargo run --release --bin estimate
// cargo run --release --bin estimate -- data.csv t GradientBoostedTreeRegressor treatment outcome
// cargo run --release --bin estimate -- data.csv s LinearRegression treatment outcome

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reina::learners::{SLearner, TLearner, TreatmentEffects};
use reina::model::Model;
use reina::Dataset;
use std::env;
use std::error::Error;
use std::time::SystemTime;

/// Toy randomized experiment: outcome responds to the treatment with a
/// heterogeneous effect of 1 + var3, so the true ATE is 1.5.
fn synthetic_data(n: usize, seed: u64) -> Result<Dataset, Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut var1 = Vec::with_capacity(n);
    let mut var2 = Vec::with_capacity(n);
    let mut var3 = Vec::with_capacity(n);
    let mut treatment = Vec::with_capacity(n);
    let mut outcome = Vec::with_capacity(n);
    for _ in 0..n {
        let v1 = rng.gen::<f64>();
        let v2 = rng.gen::<f64>();
        let v3 = rng.gen::<f64>();
        let w = if rng.gen::<f64>() < 0.5 { 1.0 } else { 0.0 };
        let noise = rng.gen::<f64>() - 0.5;
        let y = 2.0 + v1 + 0.5 * v2 + (1.0 + v3) * w + 0.1 * noise;
        var1.push(v1);
        var2.push(v2);
        var3.push(v3);
        treatment.push(w);
        outcome.push(y);
    }
    let names = ["var1", "var2", "var3", "treatment", "outcome"]
        .iter()
        .map(|n| n.to_string())
        .collect();
    Ok(Dataset::from_columns(names, vec![var1, var2, var3, treatment, outcome])?)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    let data = match args.get(1) {
        Some(path) => Dataset::from_csv(path)?,
        None => synthetic_data(10_000, 42)?,
    };
    let learner_kind = args.get(2).map(String::as_str).unwrap_or("t");
    let model_name = args.get(3).map(String::as_str).unwrap_or("GradientBoostedTreeRegressor");
    let treatment = args.get(4).map(String::as_str).unwrap_or("treatment");
    let outcome = args.get(5).map(String::as_str).unwrap_or("outcome");

    let model: Model = model_name.parse()?;
    println!("rows: {}, columns: {}", data.rows(), data.cols());

    let now = SystemTime::now();
    let effects: TreatmentEffects = match learner_kind {
        "s" => {
            let mut learner = SLearner::new(model);
            learner.fit(&data, &[treatment], outcome)?;
            learner.effects(&data, treatment)?
        }
        "t" => {
            let mut learner = TLearner::new(model.clone(), model);
            learner.fit(&data, &[treatment], outcome)?;
            learner.effects(&data, treatment)?
        }
        other => return Err(format!("unknown learner {other}, expected s or t").into()),
    };
    let elapsed = now.elapsed()?.as_secs_f32();

    let label = learner_kind.to_uppercase();
    let min = effects.cate.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = effects.cate.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    println!("{}-learner fit seconds: {:?}", label, elapsed);
    println!("{}-learner ATE: {}", label, effects.ate);
    println!("{}-learner CATE range: [{}, {}]", label, min, max);

    Ok(())
}
