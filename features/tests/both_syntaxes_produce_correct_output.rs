// The `unused_crate_dependencies` lint checks every crate in a package separately.
// See <https://github.com/rust-lang/rust/issues/57274>.
#![allow(unused_crate_dependencies)]

use features::{log, Feature};
use log::Level;

#[test]
fn both_syntaxes_produce_correct_output() {
    testing_logger::setup();

    showcase();

    testing_logger::validate(|logs| {
        itertools::assert_equal(
            logs.iter().map(|log| log.body.as_str()),
            core::iter::repeat([
                "[DebugEth1] sending request engine_newPayloadV3",
                "[DebugEth1] engine_newPayloadV3 took 4 ms",
            ])
            .take(2)
            .flatten(),
        );

        for log in logs {
            assert_eq!(log.level, Level::Info);
            assert_eq!(log.target, "features");
        }
    });
}

#[test]
fn features_are_parsed_from_their_names() {
    assert_eq!(
        "ReconstructWithPayloadBodies".parse::<Feature>().ok(),
        Some(Feature::ReconstructWithPayloadBodies),
    );

    assert!("ReconstructWithBodies".parse::<Feature>().is_err());
}

fn showcase() {
    let method = "engine_newPayloadV3";

    Feature::DebugEth1.enable();

    if Feature::DebugEth1.is_enabled() {
        Feature::DebugEth1.log(format_args!("sending request {method}"));
        Feature::DebugEth1.log(format_args!("{method} took {} ms", 2 + 2));
    }

    // This is a shorthand for the above.
    // The expressions used in the message are only evaluated if the feature is enabled.
    features::log!(DebugEth1, "sending request {method}");
    features::log!(DebugEth1, "{method} took {} ms", 2 + 2);

    // Disabled features log nothing.
    log!(DebugBlockProducer, "this is never logged");
}
