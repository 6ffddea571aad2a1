use paybridge::domain::checkout::ValidationFailure;
use paybridge::domain::classifier::{Classification, ClassificationContext, classify};
use paybridge::domain::host::AuthorizationStatus;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const CONTEXTS: [ClassificationContext; 4] = [
    ClassificationContext::CheckoutMutation,
    ClassificationContext::FullShippingAndContact,
    ClassificationContext::PartialShippingAddress,
    ClassificationContext::ShippingLine,
];

const PREFIXES: [&str; 4] = ["shippingAddress", "billingAddress", "checkout", "payment"];
const LEAVES: [&str; 11] = [
    "address1", "address2", "city", "country", "province", "zip", "firstName", "lastName",
    "phone", "email", "lineItems",
];

fn random_failure(rng: &mut StdRng) -> ValidationFailure {
    let depth: usize = rng.gen_range(0..=3);
    let mut path: Vec<&str> = (0..depth.saturating_sub(1))
        .map(|_| *PREFIXES.choose(rng).unwrap())
        .collect();
    if depth > 0 {
        path.push(*LEAVES.choose(rng).unwrap());
    }
    ValidationFailure::new(path, "is invalid")
}

fn random_failures(rng: &mut StdRng) -> Vec<ValidationFailure> {
    let len: usize = rng.gen_range(0..6);
    (0..len).map(|_| random_failure(rng)).collect()
}

#[test]
fn test_classify_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let failures = random_failures(&mut rng);
        for context in CONTEXTS {
            assert_eq!(classify(&failures, context), classify(&failures, context));
        }
    }
}

#[test]
fn test_unrecognized_failure_anywhere_abandons_checkout_mutation() {
    let mut rng = StdRng::seed_from_u64(42);
    let unrecognized = ValidationFailure::new(["checkout", "lineItems", "quantity"], "too many");

    for _ in 0..200 {
        let len: usize = rng.gen_range(0..5);
        let mut failures: Vec<_> = (0..len)
            .map(|_| {
                let prefix = if rng.gen_bool(0.5) { "billingAddress" } else { "shippingAddress" };
                ValidationFailure::new([prefix, *LEAVES.choose(&mut rng).unwrap()], "is invalid")
            })
            .collect();
        let position = rng.gen_range(0..=failures.len());
        failures.insert(position, unrecognized.clone());

        let result = classify(&failures, ClassificationContext::CheckoutMutation);
        assert_eq!(result, Classification::Abandoned);
        assert_eq!(result.into_parts(), (AuthorizationStatus::Failure, vec![]));
    }
}

#[test]
fn test_errors_only_accompany_partial_statuses() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let failures = random_failures(&mut rng);
        for context in CONTEXTS {
            let (status, errors) = classify(&failures, context).into_parts();
            if status == AuthorizationStatus::Failure {
                assert!(errors.is_empty(), "{context:?} {failures:?}");
            } else {
                assert!(!errors.is_empty());
                assert_eq!(errors.last().unwrap().kind.status(), status);
            }
        }
    }
}

#[test]
fn test_partial_shipping_example() {
    let failures = vec![
        ValidationFailure::new(["shippingAddress", "zip"], "is invalid"),
        ValidationFailure::new(["billingAddress", "city"], "is invalid"),
    ];
    let (status, errors) =
        classify(&failures, ClassificationContext::PartialShippingAddress).into_parts();
    assert_eq!(status, AuthorizationStatus::InvalidShippingAddress);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field.as_deref(), Some("zip"));
}
