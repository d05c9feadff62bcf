//! Airline Governance Tests
//!
//! Sponsored registration, automatic admission below the threshold,
//! majority voting above it, duplicate vote rejection and funding.

mod common;

use common::*;
use flight_surety::events::ProtocolEvent;
use flight_surety::governance::{Admission, RegistrationState};
use flight_surety::{ether, FlightSuretyError};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_initial_operational_status() {
    let system = setup_system();
    assert!(system.is_operational());
}

#[tokio::test]
async fn test_unfunded_founder_cannot_sponsor() {
    let system = setup_system();

    let result = system.register_member(&airline(1), &founder()).await;
    assert_eq!(result, Err(FlightSuretyError::SponsorNotEligible(founder())));
    assert!(!system.is_airline(&airline(1)).await);
}

#[tokio::test]
async fn test_founder_funding_matches_deposit() {
    let system = setup_system();

    system.fund_member(&founder(), ether(10)).await.unwrap();
    let summary = system.get_airline(&founder()).await;
    assert_eq!(summary.funded_amount, ether(10));
    assert_eq!(summary.registration_state, RegistrationState::Registered);
}

#[tokio::test]
async fn test_registered_but_unfunded_airline_cannot_sponsor() {
    let system = setup_system();
    system.fund_member(&founder(), ether(10)).await.unwrap();
    system.register_member(&airline(1), &founder()).await.unwrap();

    let result = system.register_member(&airline(2), &airline(1)).await;
    assert_err!(result);
    assert!(!system.is_airline(&airline(2)).await);

    system.fund_member(&airline(1), ether(10)).await.unwrap();
    assert_eq!(
        system.register_member(&airline(2), &airline(1)).await,
        Ok(Admission::Registered)
    );
}

#[tokio::test]
async fn test_fourth_candidate_admitted_without_votes() {
    let system = setup_system();
    system.fund_member(&founder(), ether(10)).await.unwrap();

    for i in 1..=4 {
        assert_eq!(
            system.register_member(&airline(i), &founder()).await,
            Ok(Admission::Registered)
        );
    }
    assert!(system.is_airline(&airline(4)).await);
    assert_eq!(system.tally(&airline(4)).await.approve_count, 0);
    assert_eq!(system.get_number_registered_airlines().await, 4);
}

#[tokio::test]
async fn test_fifth_candidate_waits_for_vote() {
    let system = setup_system();
    let airlines = setup_funded_airlines(&system, 4).await;

    let admission = system.register_member(&airline(5), &airlines[2]).await;
    assert_eq!(admission, Ok(Admission::PendingVote));
    assert!(!system.is_airline(&airline(5)).await);
    assert_eq!(system.get_number_registered_airlines().await, 4);
    assert_eq!(system.ledger().open_ballots(), 1);

    // Registering again is a no-op, not a second ballot
    assert_eq!(
        system.register_member(&airline(5), &airlines[3]).await,
        Ok(Admission::Unchanged(RegistrationState::PendingVote))
    );
    assert_eq!(system.ledger().open_ballots(), 1);
}

#[tokio::test]
async fn test_double_vote_rejected_and_tally_unchanged() {
    let system = setup_system();
    let airlines = setup_funded_airlines(&system, 4).await;
    system.register_member(&airline(5), &founder()).await.unwrap();

    assert_ok!(system.cast_vote(&airline(5), &airlines[2], true).await);
    let before = system.tally(&airline(5)).await;

    assert_eq!(
        system.cast_vote(&airline(5), &airlines[2], true).await,
        Err(FlightSuretyError::duplicate_vote(&airlines[2], &airline(5)))
    );
    assert_eq!(
        system.cast_vote(&airline(5), &airlines[2], false).await,
        Err(FlightSuretyError::duplicate_vote(&airlines[2], &airline(5)))
    );

    let after = system.tally(&airline(5)).await;
    assert_eq!(before, after);
    assert_eq!(after.approve_count, 1);
    assert_eq!(system.ledger().votes(&airline(5)).await.len(), 1);
}

#[tokio::test]
async fn test_half_approval_admits_candidate() {
    let system = setup_system();
    let airlines = setup_funded_airlines(&system, 4).await;
    system.register_member(&airline(5), &founder()).await.unwrap();

    let receipt = system.cast_vote(&airline(5), &airlines[0], true).await.unwrap();
    assert!(!receipt.admitted);
    assert_eq!(receipt.tally.approve_count, 1);
    assert_eq!(receipt.tally.total_eligible, 4);
    assert!(!system.is_airline(&airline(5)).await);

    let receipt = system.cast_vote(&airline(5), &airlines[1], true).await.unwrap();
    assert!(receipt.admitted);
    assert_eq!(receipt.tally.approve_count, 2);
    assert!(system.is_airline(&airline(5)).await);
    assert_eq!(system.get_number_registered_airlines().await, 5);

    let admitted: Vec<_> = system
        .events()
        .events_since(0)
        .await
        .into_iter()
        .filter(|r| {
            r.event
                == ProtocolEvent::CandidateAdmitted {
                    candidate: airline(5),
                }
        })
        .collect();
    assert_eq!(admitted.len(), 1);
}

#[tokio::test]
async fn test_votes_after_admission_change_nothing() {
    let system = setup_system();
    let airlines = setup_funded_airlines(&system, 4).await;
    system.register_member(&airline(5), &founder()).await.unwrap();

    system.cast_vote(&airline(5), &airlines[0], true).await.unwrap();
    system.cast_vote(&airline(5), &airlines[1], true).await.unwrap();
    let receipt = system.cast_vote(&airline(5), &airlines[2], true).await.unwrap();

    assert!(!receipt.admitted);
    assert!(system.is_airline(&airline(5)).await);
}

#[tokio::test]
async fn test_unfunded_members_are_outside_the_electorate() {
    let system = setup_system();
    system.fund_member(&founder(), ether(10)).await.unwrap();
    for i in 1..=4 {
        system.register_member(&airline(i), &founder()).await.unwrap();
    }
    // Only two of the four registered airlines fund
    system.fund_member(&airline(1), ether(10)).await.unwrap();
    system.fund_member(&airline(2), ether(10)).await.unwrap();

    system.register_member(&airline(5), &founder()).await.unwrap();
    assert_eq!(
        system.cast_vote(&airline(5), &airline(3), true).await,
        Err(FlightSuretyError::VoterNotEligible(airline(3)))
    );

    // 1 of 2 eligible is enough
    let receipt = system.cast_vote(&airline(5), &airline(1), true).await.unwrap();
    assert_eq!(receipt.tally.total_eligible, 2);
    assert!(receipt.admitted);
}

#[tokio::test]
async fn test_funding_is_monotonic() {
    let system = setup_system();

    system.fund_member(&founder(), 3).await.unwrap();
    system.fund_member(&founder(), 5).await.unwrap();
    assert_eq!(system.get_airline(&founder()).await.funded_amount, 8);
    assert!(!system.registry().is_eligible(&founder()).await);

    system.fund_member(&founder(), ether(10) - 8).await.unwrap();
    assert!(system.registry().is_eligible(&founder()).await);
}

#[tokio::test]
async fn test_pending_candidate_may_fund() {
    let system = setup_system();
    setup_funded_airlines(&system, 4).await;
    system.register_member(&airline(5), &founder()).await.unwrap();

    let summary = system.fund_member(&airline(5), ether(10)).await.unwrap();
    assert_eq!(summary.registration_state, RegistrationState::PendingVote);
    assert!(!system.registry().is_eligible(&airline(5)).await);
}

#[tokio::test]
async fn test_unknown_member_cannot_fund() {
    let system = setup_system();
    assert_eq!(
        system.fund_member(&airline(9), ether(10)).await,
        Err(FlightSuretyError::UnknownMember(airline(9)))
    );
}

#[tokio::test]
async fn test_paused_system_blocks_governance() {
    let system = setup_system();
    let airlines = setup_funded_airlines(&system, 4).await;
    system.register_member(&airline(5), &founder()).await.unwrap();

    assert_eq!(
        system.set_operational(false, &airlines[0]).await,
        Err(FlightSuretyError::Unauthorized(airlines[0].clone()))
    );
    system.set_operational(false, &founder()).await.unwrap();

    assert_eq!(
        system.register_member(&airline(6), &founder()).await,
        Err(FlightSuretyError::SystemPaused)
    );
    assert_eq!(
        system.fund_member(&airlines[0], 1).await,
        Err(FlightSuretyError::SystemPaused)
    );
    assert_eq!(
        system.cast_vote(&airline(5), &airlines[0], true).await,
        Err(FlightSuretyError::SystemPaused)
    );
    // Reads keep working
    assert_eq!(system.get_number_registered_airlines().await, 4);
    assert_eq!(system.tally(&airline(5)).await.approve_count, 0);

    system.set_operational(true, &founder()).await.unwrap();
    assert_ok!(system.cast_vote(&airline(5), &airlines[0], true).await);
}

#[tokio::test]
async fn test_admission_end_to_end() {
    let system = setup_system();
    system.fund_member(&founder(), ether(10)).await.unwrap();

    for i in 1..=4 {
        system.register_member(&airline(i), &founder()).await.unwrap();
        system.fund_member(&airline(i), ether(10)).await.unwrap();
        assert!(system.is_airline(&airline(i)).await);
    }

    assert_eq!(
        system.register_member(&airline(5), &founder()).await,
        Ok(Admission::PendingVote)
    );

    let first = system.cast_vote(&airline(5), &airline(1), true).await.unwrap();
    assert_eq!((first.tally.approve_count, first.tally.total_eligible), (1, 4));
    assert_eq!(
        system.get_airline(&airline(5)).await.registration_state,
        RegistrationState::PendingVote
    );

    let second = system.cast_vote(&airline(5), &airline(2), true).await.unwrap();
    assert_eq!((second.tally.approve_count, second.tally.total_eligible), (2, 4));
    assert_eq!(
        system.get_airline(&airline(5)).await.registration_state,
        RegistrationState::Registered
    );
    assert!(system.events().verify_chain().await);
}

#[tokio::test]
async fn test_founding_airline_cannot_tip_a_vote() {
    let system = setup_system();
    let airlines = setup_funded_airlines(&system, 4).await;
    system.register_member(&airline(5), &founder()).await.unwrap();

    assert_eq!(
        system.cast_vote(&airline(5), &founder(), true).await,
        Err(FlightSuretyError::VoterNotEligible(founder()))
    );
    assert_eq!(system.tally(&airline(5)).await.approve_count, 0);

    // One elector out of four is still short of a majority
    let receipt = system.cast_vote(&airline(5), &airlines[0], true).await.unwrap();
    assert_eq!((receipt.tally.approve_count, receipt.tally.total_eligible), (1, 4));
    assert!(!receipt.admitted);
    assert!(!system.is_airline(&airline(5)).await);
    assert!(system.ledger().votes(&airline(5)).await.iter().all(|v| v.voter != founder()));
}
