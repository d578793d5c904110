// Autoconf
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use autoconf_core::prefilter::{OnClassFilter, Outcomes};
use autoconf_core::{FilterContext, ImportFilter, ImportFilterChain, MetadataIndex, PrefilterMode, StaticOracle, UnitName};
use proptest::prelude::*;

fn units(count: usize) -> Vec<UnitName> {
    (0..count).map(|i| UnitName::new(format!("com.example.Unit{i}"))).collect()
}

/// Every fifth unit has no metadata; every third requires a symbol missing from the build.
fn metadata_for(units: &[UnitName]) -> MetadataIndex {
    MetadataIndex::from_pairs(units.iter().enumerate().filter(|(i, _)| i % 5 != 4).map(|(i, unit)| {
        let symbol = if i % 3 == 0 { format!("missing.Symbol{i}") } else { format!("present.Symbol{}", i % 7) };
        (format!("{unit}.ConditionalOnClass"), symbol)
    }))
}

fn oracle() -> StaticOracle {
    StaticOracle::new((0..7).map(|i| format!("present.Symbol{i}")))
}

fn on_class_outcomes(mode: PrefilterMode, units: &[UnitName], context: &FilterContext<'_>) -> Outcomes {
    let slots: Vec<Option<&UnitName>> = units.iter().map(Some).collect();
    OnClassFilter::new(mode).outcomes(&slots, context)
}

#[test]
fn test_ten_thousand_units_serial_matches_parallel() {
    let units = units(10_000);
    let metadata = metadata_for(&units);
    let oracle = oracle();
    let context = FilterContext { oracle: &oracle, metadata: &metadata };

    let serial = on_class_outcomes(PrefilterMode::Serial, &units, &context);
    let parallel = on_class_outcomes(PrefilterMode::Parallel, &units, &context);

    assert_eq!(serial.len(), 10_000);
    assert_eq!(serial, parallel);
    assert_eq!(serial.iter().flatten().count(), units.iter().enumerate().filter(|(i, _)| i % 3 == 0 && i % 5 != 4).count());
}

#[test]
fn test_chain_results_do_not_depend_on_mode() {
    let units = units(257);
    let metadata = metadata_for(&units);
    let oracle = oracle();
    let context = FilterContext { oracle: &oracle, metadata: &metadata };

    let serial = ImportFilterChain::standard(PrefilterMode::Serial).apply(&units, &context);
    let parallel = ImportFilterChain::standard(PrefilterMode::Parallel).apply(&units, &context);
    assert_eq!(serial, parallel);
    assert_eq!(serial.survivors.len() + serial.rejected.len(), units.len());
}

proptest! {
    #[test]
    fn prop_split_preserves_alignment(count in 0usize..400) {
        let units = units(count);
        let metadata = metadata_for(&units);
        let oracle = oracle();
        let context = FilterContext { oracle: &oracle, metadata: &metadata };

        let serial = on_class_outcomes(PrefilterMode::Serial, &units, &context);
        let parallel = on_class_outcomes(PrefilterMode::Parallel, &units, &context);
        prop_assert_eq!(serial.len(), count);
        prop_assert_eq!(serial, parallel);
    }

    #[test]
    fn prop_closed_slots_stay_closed(closed in prop::collection::vec(any::<bool>(), 0..120)) {
        let units = units(closed.len());
        let metadata = metadata_for(&units);
        let oracle = oracle();
        let context = FilterContext { oracle: &oracle, metadata: &metadata };
        let slots: Vec<Option<&UnitName>> = units.iter().zip(&closed).map(|(unit, &closed)| (!closed).then_some(unit)).collect();

        let outcomes = OnClassFilter::new(PrefilterMode::Parallel).outcomes(&slots, &context);
        prop_assert_eq!(outcomes.len(), slots.len());
        for (slot, outcome) in slots.iter().zip(&outcomes) {
            prop_assert!(slot.is_some() || outcome.is_none());
        }
    }
}
