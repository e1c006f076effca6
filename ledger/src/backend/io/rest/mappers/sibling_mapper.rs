use shared::{SiblingGroup, SiblingGroupsResponse};
use std::collections::BTreeMap;

use crate::backend::domain::models::{GuardianKey, Student};

pub struct SiblingMapper;

impl SiblingMapper {
    pub fn to_response(groups: &BTreeMap<GuardianKey, Vec<Student>>) -> SiblingGroupsResponse {
        SiblingGroupsResponse {
            groups: groups
                .iter()
                .map(|(key, members)| SiblingGroup {
                    guardian_identity: key.to_string(),
                    student_ids: members.iter().map(|s| s.id.clone()).collect(),
                    student_names: members.iter().map(|s| s.name.clone()).collect(),
                })
                .collect(),
        }
    }
}
