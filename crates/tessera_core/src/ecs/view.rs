//! # Views
//!
//! One-shot iteration over entities holding every component in a set.
//!
//! The first type parameter drives the iteration: its packed pool is walked
//! in order and every other pool is probed with an O(1) membership test. The
//! result is the same for any order, but listing the rarest component first
//! means fewer probes.
//!
//! A view yields nothing if any of its pools was never created, or if the
//! same component type is listed twice. The callback cannot reach the
//! registry, so pools cannot be restructured mid-iteration.

use super::component::{Component, ComponentKind};
use super::entity::EntityId;
use super::registry::Registry;
use super::storage::{AnyPool as _, ComponentPool};

macro_rules! impl_view {
    ($(#[$doc:meta])* $name:ident => $Driver:ident $driver:ident $(, $T:ident $t:ident)*) => {
        $(#[$doc])*
        pub fn $name<$Driver, $($T,)* F>(&mut self, mut each: F) -> usize
        where
            $Driver: Component,
            $($T: Component,)*
            F: FnMut(EntityId, &mut $Driver $(, &mut $T)*),
        {
            let (Some($driver), $(Some($t),)*) =
                (ComponentKind::lookup::<$Driver>(), $(ComponentKind::lookup::<$T>(),)*)
            else {
                return 0;
            };
            let [Some($driver) $(, Some($t))*] = self.pools.disjoint_mut([$driver $(, $t)*])
            else {
                return 0;
            };
            let (Some($driver), $(Some($t),)*) = (
                $driver.as_any_mut().downcast_mut::<ComponentPool<$Driver>>(),
                $($t.as_any_mut().downcast_mut::<ComponentPool<$T>>(),)*
            ) else {
                return 0;
            };

            let mut matched = 0;
            for position in 0..$driver.len() {
                let (id, first) = $driver.entry_mut(position);
                $(
                    if !$t.contains(id) {
                        continue;
                    }
                )*
                each(id, first $(, &mut $t[id])*);
                matched += 1;
            }
            matched
        }
    };
}

impl Registry {
    impl_view! {
        /// Visits every entity with an `A`. Returns the number of visits.
        ///
        /// Equivalent to iterating [`ComponentPool::iter_mut`] for `A`.
        view1 => A a
    }

    impl_view! {
        /// Visits every entity with both an `A` and a `B`. Returns the number
        /// of visits.
        ///
        /// ```rust,ignore
        /// registry.view2::<Velocity, Position, _>(|_, velocity, position| {
        ///     position.x += velocity.x;
        /// });
        /// ```
        view2 => A a, B b
    }

    impl_view! {
        /// Visits every entity with an `A`, a `B` and a `C`. Returns the
        /// number of visits.
        view3 => A a, B b, C c
    }

    impl_view! {
        /// Visits every entity with all four components. Returns the number
        /// of visits.
        view4 => A a, B b, C c, D d
    }
}
