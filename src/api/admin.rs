use mongodb::{
    bson::{doc, DateTime as BsonDateTime, Document},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    ClientSession,
};
use rocket::{
    futures::TryStreamExt,
    serde::json::{json, Json},
    Route, State,
};
use serde::de::DeserializeOwned;

use crate::{
    error::{Error, Result},
    model::{
        api::{
            now, CandidateDescription, CandidatePatch, CandidateSpec, ElectionDescription,
            ElectionPatch, ElectionSpec, Message, Patch, ProfileDescription, ProfilePatch,
            ProfileSpec,
        },
        auth::AuthToken,
        common::{CandidateId, ElectionId},
        db::{Candidate, Election, Profile},
        mongodb::{
            id_filter, ids_filter, is_duplicate_key, Coll, Counter, Transaction,
            CANDIDATE_ID_COUNTER_ID, ELECTION_ID_COUNTER_ID,
        },
    },
    updates::{UpdateKind, Updates},
};

pub fn routes() -> Vec<Route> {
    routes![
        create_election,
        update_election,
        delete_election,
        create_candidate,
        update_candidate,
        delete_candidate,
        create_profile,
        update_profile,
        delete_profile,
    ]
}

#[post("/api/admin/elections", data = "<spec>", format = "json")]
async fn create_election(
    _token: AuthToken,
    spec: Json<ElectionSpec>,
    mut transaction: Transaction,
    elections: Coll<Election>,
    counters: Coll<Counter>,
    updates: &State<Updates>,
) -> Result<Json<ElectionDescription>> {
    let id = Counter::next(&counters, ELECTION_ID_COUNTER_ID).await?;
    let election = spec.0.into_election(id);
    elections
        .insert_one_with_session(&election, None, &mut transaction)
        .await?;
    transaction.commit().await?;

    let election = ElectionDescription::from(election);
    updates.publish(UpdateKind::ElectionCreated, &election);
    Ok(Json(election))
}

#[put("/api/admin/elections/<election_id>", data = "<patch>", format = "json")]
async fn update_election(
    _token: AuthToken,
    election_id: ElectionId,
    patch: Json<ElectionPatch>,
    mut transaction: Transaction,
    elections: Coll<Election>,
    updates: &State<Updates>,
) -> Result<Json<ElectionDescription>> {
    let changes = patch.changes()?;
    let election = set_fields(&elections, election_id, changes, &mut transaction)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
    transaction.commit().await?;

    let election = ElectionDescription::from(election);
    updates.publish(UpdateKind::ElectionUpdated, &election);
    Ok(Json(election))
}

/// Delete an election along with all of its candidates and their profiles.
#[delete("/api/admin/elections/<election_id>")]
async fn delete_election(
    _token: AuthToken,
    election_id: ElectionId,
    mut transaction: Transaction,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    profiles: Coll<Profile>,
    updates: &State<Updates>,
) -> Result<Json<Message>> {
    let result = elections
        .delete_one_with_session(id_filter(election_id), None, &mut transaction)
        .await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Election {election_id}")));
    }

    // Cascade to candidates and their profiles.
    let in_election = doc! { "election_id": election_id };
    let mut cursor = candidates
        .find_with_session(in_election.clone(), None, &mut transaction)
        .await?;
    let candidate_ids: Vec<CandidateId> = cursor
        .stream(&mut transaction)
        .map_ok(|candidate| candidate.id)
        .try_collect()
        .await?;
    if !candidate_ids.is_empty() {
        let removed_profiles = profiles
            .delete_many_with_session(ids_filter(candidate_ids), None, &mut transaction)
            .await?
            .deleted_count;
        let removed_candidates = candidates
            .delete_many_with_session(in_election, None, &mut transaction)
            .await?
            .deleted_count;
        debug!(
            "Election {election_id} took {removed_candidates} candidate(s) and {removed_profiles} profile(s) with it"
        );
    }
    transaction.commit().await?;

    updates.publish(UpdateKind::ElectionDeleted, &json!({ "id": election_id }));
    Ok(Json(Message::new("Election deleted")))
}

#[post("/api/admin/candidates", data = "<spec>", format = "json")]
async fn create_candidate(
    _token: AuthToken,
    spec: Json<CandidateSpec>,
    mut transaction: Transaction,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    counters: Coll<Counter>,
    updates: &State<Updates>,
) -> Result<Json<CandidateDescription>> {
    ensure_election_exists(&elections, spec.election_id, &mut transaction).await?;

    let id = Counter::next(&counters, CANDIDATE_ID_COUNTER_ID).await?;
    let candidate = spec.0.into_candidate(id);
    candidates
        .insert_one_with_session(&candidate, None, &mut transaction)
        .await?;
    transaction.commit().await?;

    let candidate = CandidateDescription::from(candidate);
    updates.publish(UpdateKind::CandidateCreated, &candidate);
    Ok(Json(candidate))
}

#[put("/api/admin/candidates/<candidate_id>", data = "<patch>", format = "json")]
async fn update_candidate(
    _token: AuthToken,
    candidate_id: CandidateId,
    patch: Json<CandidatePatch>,
    mut transaction: Transaction,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    updates: &State<Updates>,
) -> Result<Json<CandidateDescription>> {
    let existing = candidates
        .find_one_with_session(id_filter(candidate_id), None, &mut transaction)
        .await?;
    if existing.is_none() {
        return Err(Error::not_found(format!("Candidate {candidate_id}")));
    }
    if let Some(election_id) = patch.election_id {
        ensure_election_exists(&elections, election_id, &mut transaction).await?;
    }

    let changes = patch.changes()?;
    let candidate = set_fields(&candidates, candidate_id, changes, &mut transaction)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate {candidate_id}")))?;
    transaction.commit().await?;

    let candidate = CandidateDescription::from(candidate);
    updates.publish(UpdateKind::CandidateUpdated, &candidate);
    Ok(Json(candidate))
}

/// Delete a candidate along with their profile.
#[delete("/api/admin/candidates/<candidate_id>")]
async fn delete_candidate(
    _token: AuthToken,
    candidate_id: CandidateId,
    mut transaction: Transaction,
    candidates: Coll<Candidate>,
    profiles: Coll<Profile>,
    updates: &State<Updates>,
) -> Result<Json<Message>> {
    let result = candidates
        .delete_one_with_session(id_filter(candidate_id), None, &mut transaction)
        .await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Candidate {candidate_id}")));
    }
    profiles
        .delete_one_with_session(id_filter(candidate_id), None, &mut transaction)
        .await?;
    transaction.commit().await?;

    updates.publish(UpdateKind::CandidateDeleted, &json!({ "id": candidate_id }));
    Ok(Json(Message::new("Candidate deleted")))
}

#[post("/api/admin/profiles", data = "<spec>", format = "json")]
async fn create_profile(
    _token: AuthToken,
    spec: Json<ProfileSpec>,
    mut transaction: Transaction,
    candidates: Coll<Candidate>,
    profiles: Coll<Profile>,
    updates: &State<Updates>,
) -> Result<Json<ProfileDescription>> {
    let candidate_id = spec.candidate_id;
    let candidate = candidates
        .find_one_with_session(id_filter(candidate_id), None, &mut transaction)
        .await?;
    if candidate.is_none() {
        return Err(Error::not_found(format!("Candidate {candidate_id}")));
    }
    let existing = profiles
        .find_one_with_session(id_filter(candidate_id), None, &mut transaction)
        .await?;
    if existing.is_some() {
        return Err(profile_exists(candidate_id));
    }

    let profile = spec.0.into_profile();
    match profiles
        .insert_one_with_session(&profile, None, &mut transaction)
        .await
    {
        Ok(_) => {}
        Err(e) if is_duplicate_key(&e) => return Err(profile_exists(candidate_id)),
        Err(e) => return Err(e.into()),
    }
    transaction.commit().await?;

    let profile = ProfileDescription::from(profile);
    updates.publish(UpdateKind::ProfileCreated, &profile);
    Ok(Json(profile))
}

#[put("/api/admin/profiles/<candidate_id>", data = "<patch>", format = "json")]
async fn update_profile(
    _token: AuthToken,
    candidate_id: CandidateId,
    patch: Json<ProfilePatch>,
    mut transaction: Transaction,
    profiles: Coll<Profile>,
    updates: &State<Updates>,
) -> Result<Json<ProfileDescription>> {
    let mut changes = patch.changes()?;
    changes.insert("last_updated", BsonDateTime::from_chrono(now()));
    let profile = set_fields(&profiles, candidate_id, changes, &mut transaction)
        .await?
        .ok_or_else(|| Error::not_found(format!("Profile for candidate {candidate_id}")))?;
    transaction.commit().await?;

    let profile = ProfileDescription::from(profile);
    updates.publish(UpdateKind::ProfileUpdated, &profile);
    Ok(Json(profile))
}

#[delete("/api/admin/profiles/<candidate_id>")]
async fn delete_profile(
    _token: AuthToken,
    candidate_id: CandidateId,
    mut transaction: Transaction,
    profiles: Coll<Profile>,
    updates: &State<Updates>,
) -> Result<Json<Message>> {
    let result = profiles
        .delete_one_with_session(id_filter(candidate_id), None, &mut transaction)
        .await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Profile for candidate {candidate_id}")));
    }
    transaction.commit().await?;

    updates.publish(
        UpdateKind::ProfileDeleted,
        &json!({ "candidate_id": candidate_id }),
    );
    Ok(Json(Message::new("Profile deleted")))
}

fn profile_exists(candidate_id: CandidateId) -> Error {
    Error::Conflict(format!("Profile for candidate {candidate_id} already exists"))
}

async fn ensure_election_exists(
    elections: &Coll<Election>,
    election_id: ElectionId,
    session: &mut ClientSession,
) -> Result<()> {
    let election = elections
        .find_one_with_session(id_filter(election_id), None, session)
        .await?;
    match election {
        Some(_) => Ok(()),
        None => Err(Error::MissingReference(format!(
            "Election {election_id} does not exist"
        ))),
    }
}

/// `$set` the given fields on the record with ID `id` and return the result,
/// or `None` if there is no such record. With no changes the record is
/// returned as is.
async fn set_fields<T>(
    coll: &Coll<T>,
    id: u32,
    changes: Document,
    session: &mut ClientSession,
) -> Result<Option<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    if changes.is_empty() {
        return Ok(coll.find_one_with_session(id_filter(id), None, session).await?);
    }
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let updated = coll
        .find_one_and_update_with_session(id_filter(id), doc! { "$set": changes }, options, session)
        .await?;
    Ok(updated)
}
