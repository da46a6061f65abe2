use tinyfit_core::Tensor;

// Shared by several integration test binaries; not every binary uses every helper.
#[allow(dead_code)]
pub fn create_test_tensor(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

/// Two well-separated clusters in 2D, labelled 0 and 1.
#[allow(dead_code)]
pub fn two_clusters() -> (Tensor, Tensor) {
    let points = vec![
        -2.0, -1.5, -1.8, -2.2, -2.5, -1.9, -1.6, -2.4, //
        2.0, 1.5, 1.8, 2.2, 2.5, 1.9, 1.6, 2.4,
    ];
    let labels = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
    (
        create_test_tensor(points, vec![8, 2]),
        create_test_tensor(labels, vec![8]),
    )
}
