use serde::Serialize;

const POLICY_VERSION: &str = "2012-10-17";
const LAMBDA_SERVICE: &str = "lambda.amazonaws.com";

/// IAM policy naming who may assume the function's execution role.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TrustPolicy {
    version: &'static str,
    statement: Vec<TrustStatement>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct TrustStatement {
    effect: &'static str,
    principal: Principal,
    action: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Principal {
    service: &'static str,
}

impl TrustPolicy {
    pub fn lambda_assume_role() -> Self {
        Self {
            version: POLICY_VERSION,
            statement: vec![TrustStatement {
                effect: "Allow",
                principal: Principal {
                    service: LAMBDA_SERVICE,
                },
                action: "sts:AssumeRole",
            }],
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
