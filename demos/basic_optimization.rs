//! Minimize a shifted quadratic over a single uniform parameter.

use bayesopt::{Optimizer, Param, UniformParam};

fn main() -> bayesopt::Result<()> {
    let x = UniformParam::new("x", -10.0, 10.0);
    let opt = Optimizer::builder()
        .param(x.clone())
        .rounds(30)
        .seed(42)
        .output_name("loss")
        .build()?;

    let (best, y) = opt.optimize(|p| {
        let v = p[&x.id()];
        (v - 2.0).powi(2) + 1.0
    })?;

    println!("evaluated {} points", opt.gp().len());
    println!("best {} = {:.4} -> loss {:.4}", x.name(), best[&x.id()], y);
    Ok(())
}
