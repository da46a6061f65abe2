use super::*;
use crate::tensor::{ones, zeros};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_zeros_and_ones() -> Result<(), TinyfitError> {
    let t = ones(&[2, 3])?;
    zeros_(&t)?;
    assert!(t.get_f32_data()?.iter().all(|&x| x == 0.0));
    ones_(&t)?;
    assert!(t.get_f32_data()?.iter().all(|&x| x == 1.0));
    Ok(())
}

#[test]
fn test_kaiming_uniform_respects_bound() -> Result<(), TinyfitError> {
    let mut rng = StdRng::seed_from_u64(7);
    let w = zeros(&[10, 784])?;
    kaiming_uniform_(&w, &mut rng)?;
    let bound = 1.0 / 784f32.sqrt();
    let data = w.get_f32_data()?;
    assert!(data.iter().all(|v| v.abs() <= bound + 1e-6));
    assert!(data.iter().any(|&v| v != 0.0));
    Ok(())
}

#[test]
fn test_fan_in_of_conv_weight() -> Result<(), TinyfitError> {
    assert_eq!(fan_in(&[16, 1, 3, 3])?, 9);
    assert_eq!(fan_in(&[10, 784])?, 784);
    assert!(fan_in(&[5]).is_err());
    Ok(())
}

#[test]
fn test_uniform_rejects_non_positive_bound() -> Result<(), TinyfitError> {
    let mut rng = StdRng::seed_from_u64(0);
    let t = zeros(&[2])?;
    assert!(uniform_(&t, 0.0, &mut rng).is_err());
    Ok(())
}
