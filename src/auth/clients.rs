use std::fmt;

use oauth2::{AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, TokenUrl, basic::BasicClient};
use serde::Deserialize;
use serde_json::Value;

use crate::{AppResult, GetField};

type HappyClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ClientProvider {
    Google,
    Facebook,
}

impl ClientProvider {
    /// Stable key stored in `users.oauth_provider`.
    pub fn id(&self) -> &str {
        use ClientProvider::*;
        match self {
            Google => "google.com",
            Facebook => "facebook.com",
        }
    }

    pub(crate) fn userinfo_url(&self, access_token: &str) -> String {
        use ClientProvider::*;
        match self {
            Google => format!(
                "https://www.googleapis.com/oauth2/v2/userinfo?oauth_token={access_token}"
            ),
            Facebook => format!(
                "https://graph.facebook.com/me?fields=id,name&access_token={access_token}"
            ),
        }
    }
}

impl fmt::Display for ClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone)]
pub struct Clients {
    google_client: Option<HappyClient>,
    facebook_client: Option<HappyClient>,
}

impl Clients {
    pub fn from_json(json: Value, public_url: &str) -> AppResult<Clients> {
        let google_client = 'a: {
            let json = json.get("google");
            let Some(json) = json else {
                break 'a None;
            };
            let client_id = ClientId::new(json.get_str_field("client_id")?);
            let client_secret = ClientSecret::new(json.get_str_field("client_secret")?);

            let auth_url = AuthUrl::new("https://accounts.google.com/o/oauth2/auth".to_string()).unwrap();
            let token_url = TokenUrl::new("https://oauth2.googleapis.com/token".to_string()).unwrap();
            let redirect_url = RedirectUrl::new(format!("{public_url}/lockin/google"))?;

            Some(
                BasicClient::new(client_id)
                .set_client_secret(client_secret)
                .set_auth_uri(auth_url)
                .set_token_uri(token_url)
                .set_redirect_uri(redirect_url)
            )
        };
        let facebook_client = 'a: {
            let json = json.get("facebook");
            let Some(json) = json else {
                break 'a None;
            };
            let client_id = ClientId::new(json.get_str_field("client_id")?);
            let client_secret = ClientSecret::new(json.get_str_field("client_secret")?);

            let auth_url = AuthUrl::new("https://www.facebook.com/v19.0/dialog/oauth".to_string()).unwrap();
            let token_url = TokenUrl::new("https://graph.facebook.com/v19.0/oauth/access_token".to_string()).unwrap();
            let redirect_url = RedirectUrl::new(format!("{public_url}/lockin/facebook"))?;

            Some(
                BasicClient::new(client_id)
                .set_client_secret(client_secret)
                .set_auth_uri(auth_url)
                .set_token_uri(token_url)
                .set_redirect_uri(redirect_url)
            )
        };

        Ok(
            Clients {
                google_client,
                facebook_client,
            }
        )
    }

    /// Clients with no configured providers; local credential login only.
    pub fn none() -> Clients {
        Clients {
            google_client: None,
            facebook_client: None,
        }
    }

    pub fn get_client(&self, provider: ClientProvider) -> AppResult<HappyClient> {
        use ClientProvider::*;
        match provider {
            Google => self.google_client.clone(),
            Facebook => self.facebook_client.clone(),
        }.ok_or(anyhow::anyhow!("OAuth provider {provider} keys not supplied").into())
    }
}
