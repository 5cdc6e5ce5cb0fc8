use dojo_actions::Committed;
use dojo_api::{Client, Method, NormalizedError};
use dojo_protocol::{
    AdminUser, ChallengeItem, GroupInvite, GroupMember, MemberRank, ReportRequest, Session,
    SubmissionReport,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

type ApiResult<T> = Result<T, NormalizedError>;

/// Typed endpoint layer over the safe-call client. One method per server
/// operation; each carries its own fallback message so a body-less failure
/// still reads like this screen, not like a generic error page.
#[derive(Clone)]
pub struct Endpoints {
    client: Client,
}

impl Endpoints {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn session(&self) -> ApiResult<Session> {
        self.client
            .send_as(
                Method::Get,
                "admin/session",
                None,
                "Your session could not be verified.",
            )
            .await
    }

    pub async fn generate_report(&self, request: &ReportRequest) -> ApiResult<SubmissionReport> {
        let body = to_body(request)?;
        self.client
            .send_as(
                Method::Post,
                "admin/reports/submissions",
                Some(body),
                "The report could not be generated.",
            )
            .await
    }

    pub async fn list_challenges(&self) -> ApiResult<Vec<ChallengeItem>> {
        self.client
            .send_as(
                Method::Get,
                "admin/challenges",
                None,
                "The challenge list could not be loaded.",
            )
            .await
    }

    pub async fn list_users(&self) -> ApiResult<Vec<AdminUser>> {
        self.client
            .send_as(
                Method::Get,
                "admin/users",
                None,
                "The user list could not be loaded.",
            )
            .await
    }

    /// Commit a role or activation change. The server may answer with the
    /// canonical user or with an empty ack.
    pub async fn update_user(&self, user: &AdminUser) -> ApiResult<Committed<AdminUser>> {
        let body = json!({ "role": user.role, "active": user.active });
        let response = self
            .client
            .send(
                Method::Patch,
                &format!("admin/users/{}", user.id),
                Some(body),
                "The user could not be updated.",
            )
            .await?;
        Ok(decode_committed(response.body))
    }

    pub async fn delete_user(&self, id: i64) -> ApiResult<()> {
        self.client
            .send(
                Method::Delete,
                &format!("admin/users/{id}"),
                None,
                "The user could not be deleted.",
            )
            .await?;
        Ok(())
    }

    pub async fn list_members(&self, group_id: i64) -> ApiResult<Vec<GroupMember>> {
        self.client
            .send_as(
                Method::Get,
                &format!("admin/groups/{group_id}/members"),
                None,
                "The group roster could not be loaded.",
            )
            .await
    }

    pub async fn update_member_rank(
        &self,
        group_id: i64,
        member_id: i64,
        rank: MemberRank,
    ) -> ApiResult<Committed<GroupMember>> {
        let response = self
            .client
            .send(
                Method::Patch,
                &format!("admin/groups/{group_id}/members/{member_id}"),
                Some(json!({ "rank": rank })),
                "The member could not be updated.",
            )
            .await?;
        Ok(decode_committed(response.body))
    }

    pub async fn remove_member(&self, group_id: i64, member_id: i64) -> ApiResult<()> {
        self.client
            .send(
                Method::Delete,
                &format!("admin/groups/{group_id}/members/{member_id}"),
                None,
                "The member could not be removed.",
            )
            .await?;
        Ok(())
    }

    pub async fn list_invites(&self, group_id: i64) -> ApiResult<Vec<GroupInvite>> {
        self.client
            .send_as(
                Method::Get,
                &format!("admin/groups/{group_id}/invites"),
                None,
                "The invite list could not be loaded.",
            )
            .await
    }

    pub async fn create_invite(
        &self,
        group_id: i64,
        email: &str,
    ) -> ApiResult<Committed<GroupInvite>> {
        let response = self
            .client
            .send(
                Method::Post,
                &format!("admin/groups/{group_id}/invites"),
                Some(json!({ "email": email })),
                "The invitation could not be sent.",
            )
            .await?;
        Ok(decode_committed(response.body))
    }

    pub async fn revoke_invite(&self, group_id: i64, invite_id: i64) -> ApiResult<()> {
        self.client
            .send(
                Method::Delete,
                &format!("admin/groups/{group_id}/invites/{invite_id}"),
                None,
                "The invitation could not be revoked.",
            )
            .await?;
        Ok(())
    }

    pub async fn update_group_limits(&self, group_id: i64, min: u32, max: u32) -> ApiResult<()> {
        self.client
            .send(
                Method::Patch,
                &format!("admin/groups/{group_id}"),
                Some(json!({ "min_members": min, "max_members": max })),
                "The group settings could not be saved.",
            )
            .await?;
        Ok(())
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| NormalizedError::local(format!("Request could not be encoded: {err}")))
}

/// Mutation acknowledgments: a null body is an ack, anything decodable is
/// the canonical entity. An undecodable 2xx body is logged and treated as
/// an ack, because the server did commit.
fn decode_committed<T: DeserializeOwned>(body: Value) -> Committed<T> {
    if body.is_null() {
        return Committed::Ack;
    }
    match serde_json::from_value(body) {
        Ok(entity) => Committed::Canonical(entity),
        Err(err) => {
            log::warn!("canonical entity decode failed, treating as ack: {err}");
            Committed::Ack
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojo_protocol::Role;
    use pretty_assertions::assert_eq;

    #[test]
    fn null_bodies_decode_as_acks() {
        match decode_committed::<AdminUser>(Value::Null) {
            Committed::Ack => {}
            Committed::Canonical(user) => panic!("unexpected entity: {user:?}"),
        }
    }

    #[test]
    fn entity_bodies_decode_as_canonical() {
        let body = json!({
            "id": 9,
            "username": "vex",
            "email": "vex@dojo.test",
            "role": "member",
            "active": true
        });
        match decode_committed::<AdminUser>(body) {
            Committed::Canonical(user) => assert_eq!(user.username, "vex"),
            Committed::Ack => panic!("expected a canonical entity"),
        }
    }

    #[test]
    fn undecodable_success_bodies_degrade_to_acks() {
        match decode_committed::<AdminUser>(json!({ "unexpected": true })) {
            Committed::Ack => {}
            Committed::Canonical(user) => panic!("unexpected entity: {user:?}"),
        }
    }

    #[test]
    fn role_serializes_with_wire_spelling() {
        let body = json!({ "role": Role::Moderator, "active": false });
        assert_eq!(body["role"], json!("moderator"));
    }
}
