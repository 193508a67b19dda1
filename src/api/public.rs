use std::collections::HashMap;

use mongodb::{bson::doc, options::FindOptions};
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{CandidateWithProfile, ElectionDescription, ElectionWithCandidates},
        common::{CandidateId, ElectionId},
        db::{Candidate, Election, Profile},
        mongodb::{id_filter, ids_filter, Coll},
    },
};

pub fn routes() -> Vec<Route> {
    routes![list_elections, get_election, list_candidates, get_candidate]
}

/// Oldest first, which is id order.
fn insertion_order() -> FindOptions {
    FindOptions::builder().sort(doc! { "_id": 1 }).build()
}

#[get("/api/elections?<jurisdiction>")]
async fn list_elections(
    jurisdiction: Option<String>,
    elections: Coll<Election>,
) -> Result<Json<Vec<ElectionDescription>>> {
    let filter = jurisdiction.map(|jurisdiction| doc! { "jurisdiction": jurisdiction });
    let elections: Vec<ElectionDescription> = elections
        .find(filter, insertion_order())
        .await?
        .map_ok(ElectionDescription::from)
        .try_collect()
        .await?;
    Ok(Json(elections))
}

#[get("/api/elections/<election_id>")]
async fn get_election(
    election_id: ElectionId,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    profiles: Coll<Profile>,
) -> Result<Json<ElectionWithCandidates>> {
    let election = elections
        .find_one(id_filter(election_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;

    let filter = doc! { "election_id": election_id };
    let candidates: Vec<Candidate> = candidates
        .find(filter, insertion_order())
        .await?
        .try_collect()
        .await?;

    Ok(Json(ElectionWithCandidates {
        election: election.into(),
        candidates: with_profiles(candidates, &profiles).await?,
    }))
}

#[get("/api/candidates?<election_id>&<office>&<district>")]
async fn list_candidates(
    election_id: Option<ElectionId>,
    office: Option<String>,
    district: Option<String>,
    candidates: Coll<Candidate>,
    profiles: Coll<Profile>,
) -> Result<Json<Vec<CandidateWithProfile>>> {
    let mut filter = doc! {};
    if let Some(election_id) = election_id {
        filter.insert("election_id", election_id);
    }
    if let Some(office) = office {
        filter.insert("office", office);
    }
    if let Some(district) = district {
        filter.insert("district", district);
    }

    let candidates: Vec<Candidate> = candidates
        .find(filter, insertion_order())
        .await?
        .try_collect()
        .await?;
    Ok(Json(with_profiles(candidates, &profiles).await?))
}

#[get("/api/candidates/<candidate_id>")]
async fn get_candidate(
    candidate_id: CandidateId,
    candidates: Coll<Candidate>,
    profiles: Coll<Profile>,
) -> Result<Json<CandidateWithProfile>> {
    let candidate = candidates
        .find_one(id_filter(candidate_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate {candidate_id}")))?;
    let profile = profiles.find_one(id_filter(candidate_id), None).await?;
    Ok(Json(CandidateWithProfile::new(candidate, profile)))
}

/// Attach each candidate's profile, fetching all of them in one query.
async fn with_profiles(
    candidates: Vec<Candidate>,
    profiles: &Coll<Profile>,
) -> Result<Vec<CandidateWithProfile>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let filter = ids_filter(candidates.iter().map(|candidate| candidate.id));
    let mut by_candidate: HashMap<CandidateId, Profile> = profiles
        .find(filter, None)
        .await?
        .map_ok(|profile| (profile.candidate_id, profile))
        .try_collect()
        .await?;

    Ok(candidates
        .into_iter()
        .map(|candidate| {
            let profile = by_candidate.remove(&candidate.id);
            CandidateWithProfile::new(candidate, profile)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use mongodb::Database;
    use rocket::{http::Status, local::asynchronous::Client};

    use crate::error::ErrorBody;
    use crate::model::{
        api::ProfileSpec,
        db::{CandidateCore, ElectionCore},
    };

    use super::*;

    /// Two elections, four candidates, and a profile for candidate 1.
    async fn insert_fixtures(db: &Database) {
        let elections = Coll::<Election>::from_db(db);
        let berkeley = Election::example(1);
        let oakland = Election {
            id: 2,
            election: ElectionCore::example2(),
        };
        elections
            .insert_many([berkeley, oakland], None)
            .await
            .unwrap();

        let candidates = Coll::<Candidate>::from_db(db);
        let challenger = Candidate {
            id: 3,
            candidate: CandidateCore {
                full_name: "Adena Ishii".to_string(),
                ..CandidateCore::example(1)
            },
        };
        let councillor = Candidate {
            id: 2,
            candidate: CandidateCore::example2(1),
        };
        let elsewhere = Candidate {
            id: 4,
            candidate: CandidateCore::example(2),
        };
        // Inserted out of order, listed by id.
        candidates
            .insert_many(
                [Candidate::example(1, 1), challenger, councillor, elsewhere],
                None,
            )
            .await
            .unwrap();

        Coll::<Profile>::from_db(db)
            .insert_one(ProfileSpec::example(1).into_profile(), None)
            .await
            .unwrap();
    }

    #[backend_test]
    async fn list_all_and_filtered_elections(client: Client, db: Database) {
        insert_fixtures(&db).await;

        let response = client.get(uri!(list_elections(_))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let elections: Vec<ElectionDescription> = response.into_json().await.unwrap();
        let ids: Vec<_> = elections.iter().map(|e| e.id).collect();
        assert_eq!(vec![1, 2], ids);
        assert_eq!(ElectionCore::example().name, elections[0].name);

        let response = client
            .get("/api/elections?jurisdiction=Oakland,%20CA")
            .dispatch()
            .await;
        let elections: Vec<ElectionDescription> = response.into_json().await.unwrap();
        assert_eq!(1, elections.len());
        assert_eq!(2, elections[0].id);

        let response = client
            .get("/api/elections?jurisdiction=Nowhere")
            .dispatch()
            .await;
        let elections: Vec<ElectionDescription> = response.into_json().await.unwrap();
        assert!(elections.is_empty());
    }

    #[backend_test]
    async fn election_includes_its_candidates(client: Client, db: Database) {
        insert_fixtures(&db).await;

        let response = client.get(uri!(get_election(1))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let election: ElectionWithCandidates = response.into_json().await.unwrap();
        assert_eq!(1, election.election.id);
        let ids: Vec<_> = election.candidates.iter().map(|c| c.candidate.id).collect();
        assert_eq!(vec![1, 2, 3], ids);

        // Only the first candidate has a profile.
        let profile = election.candidates[0].profile.as_ref().unwrap();
        assert_eq!(1, profile.candidate_id);
        assert_eq!(ProfileSpec::example(1).bio_md, profile.bio_md);
        assert!(election.candidates[1].profile.is_none());
        assert!(election.candidates[2].profile.is_none());
    }

    #[backend_test]
    async fn election_without_candidates(client: Client, db: Database) {
        insert_fixtures(&db).await;
        Coll::<Election>::from_db(&db)
            .insert_one(Election::example(7), None)
            .await
            .unwrap();

        let response = client.get(uri!(get_election(7))).dispatch().await;
        let election: ElectionWithCandidates = response.into_json().await.unwrap();
        assert!(election.candidates.is_empty());
    }

    #[backend_test]
    async fn missing_election(client: Client) {
        let response = client.get(uri!(get_election(42))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!("Election 42 not found", body.detail);
    }

    #[backend_test]
    async fn candidate_filters_combine(client: Client, db: Database) {
        insert_fixtures(&db).await;

        let response = client.get(uri!(list_candidates(_, _, _))).dispatch().await;
        let candidates: Vec<CandidateWithProfile> = response.into_json().await.unwrap();
        let ids: Vec<_> = candidates.iter().map(|c| c.candidate.id).collect();
        assert_eq!(vec![1, 2, 3, 4], ids);

        let response = client
            .get("/api/candidates?election_id=1&office=Mayor")
            .dispatch()
            .await;
        let candidates: Vec<CandidateWithProfile> = response.into_json().await.unwrap();
        let ids: Vec<_> = candidates.iter().map(|c| c.candidate.id).collect();
        assert_eq!(vec![1, 3], ids);
        assert!(candidates[0].profile.is_some());

        let response = client
            .get("/api/candidates?office=City%20Council&district=District%202")
            .dispatch()
            .await;
        let candidates: Vec<CandidateWithProfile> = response.into_json().await.unwrap();
        let ids: Vec<_> = candidates.iter().map(|c| c.candidate.id).collect();
        assert_eq!(vec![2], ids);

        let response = client
            .get("/api/candidates?election_id=99")
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let candidates: Vec<CandidateWithProfile> = response.into_json().await.unwrap();
        assert!(candidates.is_empty());
    }

    #[backend_test]
    async fn single_candidate(client: Client, db: Database) {
        insert_fixtures(&db).await;

        let response = client.get(uri!(get_candidate(1))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let candidate: CandidateWithProfile = response.into_json().await.unwrap();
        assert_eq!(CandidateCore::example(1).full_name, candidate.candidate.full_name);
        assert!(candidate.profile.is_some());

        let response = client.get(uri!(get_candidate(2))).dispatch().await;
        let candidate: CandidateWithProfile = response.into_json().await.unwrap();
        assert!(candidate.profile.is_none());

        let response = client.get(uri!(get_candidate(50))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }
}
