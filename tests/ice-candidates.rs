use std::time::Instant;

use jsep_session::{Action, IceCandidate, MediaHints, SdpType, SecurePolicy, SessionError};
use jsep_session::{SessionConfig, SessionState, TransportEvent};

mod common;
use common::{host, ice_candidate, remote_answer, remote_offer, TestSession};

#[test]
fn candidate_before_remote_description_is_saved() -> Result<(), SessionError> {
    let mut t = TestSession::new(SecurePolicy::Required);

    let c1 = ice_candidate("audio", 0, 5000);
    t.session.process_ice_message(c1.clone())?;

    assert_eq!(t.session.saved_candidates().len(), 1);
    assert!(t.rec().applied.is_empty());

    t.session
        .set_remote_description(Action::Offer, remote_offer(true, true, true))?;

    let remote = t.session.remote_description().unwrap();
    assert_eq!(remote.candidates(0).len(), 1);
    assert!(remote.candidates(0)[0]
        .candidate()
        .is_equivalent(c1.candidate()));
    assert!(t.session.saved_candidates().is_empty());

    // Not applied until ICE starts.
    assert!(t.rec().applied.is_empty());

    let offer = t.session.remote_description().cloned().unwrap();
    let answer = t.session.create_answer(&MediaHints::default(), &offer)?;
    t.session.set_local_description(Action::Answer, answer)?;
    t.session.start_ice()?;

    let rec = t.rec();
    assert_eq!(rec.applied.len(), 1);
    assert_eq!(rec.applied[0].0, "audio");
    assert!(rec.applied[0].1.is_equivalent(c1.candidate()));

    Ok(())
}

#[test]
fn saved_candidate_applied_once_when_ice_already_started() -> Result<(), SessionError> {
    let mut t = TestSession::new(SecurePolicy::Required);

    let offer = t.local_offer()?;
    t.session.start_ice()?;

    t.session
        .process_ice_message(ice_candidate("video", 1, 6000))?;
    assert!(t.rec().applied.is_empty());

    let answer = remote_answer(&offer, SdpType::Answer, true, true);
    t.session.set_remote_description(Action::Answer, answer)?;

    let rec = t.rec();
    assert_eq!(rec.applied.len(), 1);
    assert_eq!(rec.applied[0].0, "video");

    Ok(())
}

#[test]
fn start_ice_needs_local_description() {
    let mut t = TestSession::new(SecurePolicy::Required);

    let err = t.session.start_ice().unwrap_err();

    assert!(matches!(err, SessionError::PreconditionNotMet(_)));
    assert!(!t.session.ice_started());
    assert_eq!(t.rec().connects, 0);
}

#[test]
fn start_ice_is_idempotent() -> Result<(), SessionError> {
    let mut t = TestSession::new(SecurePolicy::Required);
    t.local_offer()?;

    t.session.start_ice()?;
    t.session.start_ice()?;

    assert!(t.session.ice_started());
    assert_eq!(t.rec().connects, 1);

    Ok(())
}

#[test]
fn candidate_applied_immediately_after_start() -> Result<(), SessionError> {
    let mut t = TestSession::new(SecurePolicy::Required);

    let offer = t.local_offer()?;
    let answer = remote_answer(&offer, SdpType::Answer, true, true);
    t.session.set_remote_description(Action::Answer, answer)?;
    t.session.start_ice()?;
    assert!(t.rec().applied.is_empty());

    t.session
        .process_ice_message(ice_candidate("audio", 0, 5000))?;
    assert_eq!(t.rec().applied.len(), 1);

    // Same candidate again, not added twice to the description.
    t.session
        .process_ice_message(ice_candidate("audio", 0, 5000))?;
    let remote = t.session.remote_description().unwrap();
    assert_eq!(remote.candidate_count(), 1);

    Ok(())
}

#[test]
fn candidate_for_missing_section_rejected() -> Result<(), SessionError> {
    let mut t = TestSession::new(SecurePolicy::Required);
    t.session
        .set_remote_description(Action::Offer, remote_offer(true, true, true))?;

    let err = t
        .session
        .process_ice_message(ice_candidate("data", 2, 5000))
        .unwrap_err();

    assert!(matches!(err, SessionError::CandidateRejected(_)));
    assert_eq!(t.session.remote_description().unwrap().candidate_count(), 0);

    Ok(())
}

#[test]
fn transport_refusing_candidate_is_tolerated() -> Result<(), SessionError> {
    let mut t = TestSession::new(SecurePolicy::Required);
    t.rec().reject_content.push("audio".into());

    let offer = t.local_offer()?;
    t.session.start_ice()?;

    let mut answer = remote_answer(&offer, SdpType::Answer, true, true);
    answer.add_candidate(&ice_candidate("audio", 0, 5000))?;
    answer.add_candidate(&ice_candidate("video", 1, 5002))?;

    t.session.set_remote_description(Action::Answer, answer)?;

    assert_eq!(t.session.state(), SessionState::ReceivedAnswer);
    let rec = t.rec();
    assert_eq!(rec.applied.len(), 1);
    assert_eq!(rec.applied[0].0, "video");

    Ok(())
}

#[test]
fn remote_candidates_carried_into_new_remote_description() -> Result<(), SessionError> {
    let mut t = TestSession::new(SecurePolicy::Required);

    let offer = t.local_offer()?;
    let answer = remote_answer(&offer, SdpType::PrAnswer, true, true);
    t.session
        .set_remote_description(Action::ProvisionalAnswer, answer)?;
    t.session
        .process_ice_message(ice_candidate("audio", 0, 5000))?;

    let answer = remote_answer(&offer, SdpType::Answer, true, true);
    t.session.set_remote_description(Action::Answer, answer)?;

    let remote = t.session.remote_description().unwrap();
    assert_eq!(remote.sdp_type(), SdpType::Answer);
    assert_eq!(remote.candidates(0).len(), 1);

    Ok(())
}

#[test]
fn local_candidates_reach_observer_and_next_offer() -> Result<(), SessionError> {
    let mut t = TestSession::new(SecurePolicy::Required);
    let now = Instant::now();

    t.local_offer()?;
    t.session.start_ice()?;

    t.transport(
        now,
        TransportEvent::CandidatesReady {
            content_name: "video".into(),
            candidates: vec![host(7000), host(7002)],
        },
    );
    t.transport(now, TransportEvent::CandidatesAllocationDone);

    {
        let rec = t.rec();
        assert_eq!(rec.ice_candidates.len(), 2);
        assert_eq!(rec.ice_candidates[0].sdp_mid(), "video");
        assert_eq!(rec.ice_candidates[0].sdp_mline_index(), 1);
        assert_eq!(rec.ice_complete, 1);
    }

    let local = t.session.local_description().unwrap();
    assert_eq!(local.candidates(1).len(), 2);

    let reoffer = t.session.create_offer(&MediaHints::default())?;
    assert_eq!(reoffer.candidates(1).len(), 2);
    assert_eq!(reoffer.candidates(0).len(), 0);

    Ok(())
}

#[test]
fn local_candidates_for_unknown_content_dropped() -> Result<(), SessionError> {
    let mut t = TestSession::new(SecurePolicy::Required);
    t.local_offer()?;

    t.transport(
        Instant::now(),
        TransportEvent::CandidatesReady {
            content_name: "data".into(),
            candidates: vec![host(7000)],
        },
    );

    assert!(t.rec().ice_candidates.is_empty());
    assert_eq!(t.session.local_description().unwrap().candidate_count(), 0);

    Ok(())
}

#[test]
fn bundle_enabled_once_ready() -> Result<(), SessionError> {
    let mut t = TestSession::new(SecurePolicy::Required);

    let offer = t.local_offer()?;
    let answer = remote_answer(&offer, SdpType::Answer, true, true);
    t.session.set_remote_description(Action::Answer, answer)?;

    // ICE not started yet.
    assert!(t.rec().mux_groups.is_empty());

    t.session.start_ice()?;
    assert_eq!(t.rec().mux_groups, vec![vec!["audio", "video"]]);

    // Already muxed, a renegotiation doesn't do it again.
    let reoffer = t.local_offer()?;
    let answer = remote_answer(&reoffer, SdpType::Answer, true, true);
    t.session.set_remote_description(Action::Answer, answer)?;
    assert_eq!(t.rec().mux_groups.len(), 1);

    Ok(())
}

#[test]
fn no_bundle_without_group() -> Result<(), SessionError> {
    let config = SessionConfig::new().set_bundle(false);
    let mut t = TestSession::with_config(config, SecurePolicy::Required);

    let offer = t.local_offer()?;
    assert!(offer.description().groups.is_empty());
    assert_eq!(t.rec().bundle_allocation, vec![false]);

    t.session.start_ice()?;
    let answer = remote_answer(&offer, SdpType::Answer, true, true);
    t.session.set_remote_description(Action::Answer, answer)?;

    assert!(t.rec().mux_groups.is_empty());

    Ok(())
}

#[test]
fn ice_candidate_json() {
    let c = ice_candidate("audio", 0, 5000);
    let json = serde_json::to_string(&c).unwrap();
    let back: IceCandidate = serde_json::from_str(&json).unwrap();

    assert_eq!(back.sdp_mid(), "audio");
    assert!(back.candidate().is_equivalent(c.candidate()));
}
