//! Drive the round loop manually with `next` / `log`.
//!
//! Useful when evaluations happen somewhere the optimizer cannot call into
//! directly — a cluster job, a lab instrument, a human.

use bayesopt::{NormalParam, Optimizer, Param, UniformParam};

fn main() -> bayesopt::Result<()> {
    let lr = UniformParam::new("learning_rate", 1e-4, 1e-1);
    let momentum = NormalParam::new("momentum", 0.0, 1.0, 0.9, 0.1);
    let opt = Optimizer::builder()
        .param(lr.clone())
        .param(momentum.clone())
        .rounds(15)
        .seed(7)
        .build()?;

    loop {
        let (point, parallel) = opt.next();
        let Some(point) = point else { break };

        // Stand-in for the real training run.
        let loss = (point[&lr.id()] - 0.01).abs() + (point[&momentum.id()] - 0.9).abs();
        println!(
            "round {:>2} (parallel: {parallel}): lr={:.5} momentum={:.3} -> {loss:.4}",
            opt.rounds(),
            point[&lr.id()],
            point[&momentum.id()],
        );
        opt.log(&point, loss)?;
    }

    let gp = opt.gp();
    let (x, y) = gp.minimum()?;
    println!("best: lr={:.5} momentum={:.3} -> {y:.4}", x[0], x[1]);
    Ok(())
}
