use evently_core::forms::{LoginForm, SignupForm};
use evently_core::Role;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::normalize;

impl ApiClient {
    /// `POST /{role}/login`; stores the returned token for `role`
    pub async fn login(&self, role: Role, form: LoginForm) -> Result<(), ApiError> {
        let form = form.checked()?;
        let body = self
            .post_public(&format!("/{}/login", role.path_prefix()), &form)
            .await?;
        let token = normalize::token(&body)?;
        self.session().set_token(role, token)?;
        tracing::info!(%role, "Logged in");
        Ok(())
    }

    /// Local only: the backend keeps no server-side session
    pub fn logout(&self, role: Role) -> Result<(), ApiError> {
        self.session().clear_role(role)?;
        tracing::info!(%role, "Logged out");
        Ok(())
    }

    /// `POST /student/signup`; logs the new student in
    pub async fn signup(&self, form: &SignupForm) -> Result<(), ApiError> {
        let request = form.request()?;
        let body = self.post_public("/student/signup", &request).await?;
        let token = normalize::token(&body)?;
        self.session().set_token(Role::Student, token)?;
        Ok(())
    }
}
