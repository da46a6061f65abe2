use crate::tensor::Tensor;
use std::collections::HashSet;

/// Node identity in the graph: the address of the tensor's shared storage.
pub type NodeId = usize;

/// Returns every node reachable from `root` through `grad_fn` links, in
/// topological order (inputs before the tensors computed from them).
///
/// Iterative depth-first search, so deep graphs do not grow the call stack.
pub fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut sorted = Vec::new();
    // (node, inputs already expanded)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            sorted.push(node);
            continue;
        }
        if !visited.insert(node.node_id()) {
            continue;
        }
        let inputs = node.grad_fn().map(|op| op.inputs()).unwrap_or_default();
        stack.push((node, true));
        for input in inputs {
            if !visited.contains(&input.node_id()) {
                stack.push((input, false));
            }
        }
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TinyfitError;

    #[test]
    fn test_topological_sort_orders_inputs_first() -> Result<(), TinyfitError> {
        let a = Tensor::new(vec![1.0, 2.0], vec![2])?;
        a.set_requires_grad(true);
        let b = a.relu()?;
        let c = b.add(&a)?;

        let order: Vec<NodeId> = topological_sort(&c).iter().map(|t| t.node_id()).collect();
        assert_eq!(order.len(), 3);
        let pos = |t: &Tensor| order.iter().position(|&id| id == t.node_id());
        assert!(pos(&a) < pos(&b));
        assert!(pos(&b) < pos(&c));
        assert_eq!(order.last(), Some(&c.node_id()));
        Ok(())
    }

    #[test]
    fn test_leaf_sorts_to_itself() -> Result<(), TinyfitError> {
        let a = Tensor::new(vec![1.0], vec![1])?;
        let sorted = topological_sort(&a);
        assert_eq!(sorted.len(), 1);
        assert!(sorted[0].ptr_eq(&a));
        Ok(())
    }
}
