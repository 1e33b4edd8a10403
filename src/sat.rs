use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::reference::Ref;

impl Bdd {
    /// Number of satisfying assignments of `node` over variables `1..=num_vars`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bdd_abstract::bdd::Bdd;
    /// use num_bigint::BigUint;
    ///
    /// let bdd = Bdd::default();
    /// let f = bdd.apply_or(bdd.mk_var(1), bdd.mk_var(2));
    /// assert_eq!(bdd.sat_count(f, 2), BigUint::from(3u32));
    /// assert_eq!(bdd.sat_count(f, 3), BigUint::from(6u32));
    /// ```
    pub fn sat_count(&self, node: Ref, num_vars: usize) -> BigUint {
        let mut cache = HashMap::new();
        let max = BigUint::from(1u32) << num_vars;
        self.sat_count_(node, &max, &mut cache)
    }

    fn sat_count_(&self, node: Ref, max: &BigUint, cache: &mut HashMap<u32, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        } else if self.is_one(node) {
            return max.clone();
        }

        // Count the regular node; a complemented edge takes the complement.
        let index = node.index();
        let count = match cache.get(&index) {
            Some(count) => count.clone(),
            None => {
                let count_low = self.sat_count_(self.low(index), max, cache);
                let count_high = self.sat_count_(self.high(index), max, cache);
                let count: BigUint = (count_low + count_high) >> 1;
                cache.insert(index, count.clone());
                count
            }
        };

        if node.is_negated() {
            max - count
        } else {
            count
        }
    }
}
