//! Ring topology statistics.
//!
//! Ownership is measured as the fraction of the token space each member is
//! responsible for: the arc between a vnode and its predecessor belongs to
//! the vnode's owner. Uniform shares mean uniform key distribution.

use crate::member::Member;
use crate::ring::HashRing;
use crate::token::Token;
use std::collections::HashMap;

/// Fraction of the ring owned by one member.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberShare {
    pub name: String,
    /// Share of the token space in `[0.0, 1.0]`.
    pub share: f64,
    /// Vnodes the member holds on the ring.
    pub vnodes: usize,
}

/// Per-member ownership of the token space, sorted by name.
///
/// Shares sum to 1.0 on a non-empty ring; an empty ring yields nothing.
pub fn ownership<M: Member>(ring: &HashRing<M>) -> Vec<MemberShare> {
    let tokens = ring.tokens();
    let Some(&(last, _)) = tokens.last() else {
        return Vec::new();
    };

    let mut shares: HashMap<&str, (f64, usize)> = HashMap::new();
    let mut prev = last;
    for (token, owner) in &tokens {
        // A single vnode owns the whole ring, not a zero-length arc.
        let arc = if tokens.len() == 1 {
            1.0
        } else {
            prev.distance_to(token).as_fraction()
        };
        let entry = shares.entry(*owner).or_insert((0.0, 0));
        entry.0 += arc;
        entry.1 += 1;
        prev = *token;
    }

    let mut out: Vec<MemberShare> = shares
        .into_iter()
        .map(|(name, (share, vnodes))| MemberShare {
            name: name.to_owned(),
            share,
            vnodes,
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/// Largest share divided by the ideal `1/N` share; 1.0 is perfectly even.
pub fn imbalance(shares: &[MemberShare]) -> f64 {
    if shares.is_empty() {
        return 0.0;
    }
    let ideal = 1.0 / shares.len() as f64;
    let max = shares.iter().map(|s| s.share).fold(0.0, f64::max);
    max / ideal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::RingBuilder;

    #[test]
    fn test_empty_ring_has_no_shares() {
        let ring: HashRing<String> = HashRing::new();
        assert!(ownership(&ring).is_empty());
        assert_eq!(imbalance(&[]), 0.0);
    }

    #[test]
    fn test_single_vnode_owns_everything() {
        let ring = RingBuilder::new()
            .with_vnodes(1)
            .add_member("solo".to_string())
            .build()
            .unwrap();
        let shares = ownership(&ring);
        assert_eq!(shares.len(), 1);
        assert!((shares[0].share - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shares_sum_to_one_and_are_balanced() {
        let ring = RingBuilder::new()
            .with_vnodes(256)
            .add_members((0..4).map(|i| format!("node{}", i)))
            .build()
            .unwrap();
        let shares = ownership(&ring);
        assert_eq!(shares.len(), 4);

        let total: f64 = shares.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-6, "total share was {}", total);
        // 256 vnodes keep every member well within 1.5x of the ideal share.
        assert!(imbalance(&shares) < 1.5, "imbalance {}", imbalance(&shares));
    }
}
