//! A small, fully consistent `users` feature.
//!
//! `get` and `list` pass every dimension under the strict policy, so tests
//! can break exactly one thing and observe the effect.

use crate::spec::{EndpointSpec, FeatureSpec};

use super::memory_fs::MemoryFileSystem;

pub const SPEC_JSON: &str = r#"
{
  "notes": "user management",
  "endpoints": {
    "get": {
      "route": "GET /users/:id",
      "contract": {
        "file": "get.contract.ts",
        "routes": { "GET /users/:id": "getUser" },
        "imports": { "framework": ["auth", "logger"], "external": [] }
      },
      "logic": { "file": "get.logic.ts", "exports": ["getUser"] },
      "test": {
        "file": "get.test.ts",
        "test_cases": [
          { "name": "returns user when found", "status": 200 },
          { "name": "Returns 404 when user is missing", "status": 404 }
        ],
        "coverage_target": 80
      }
    },
    "list": {
      "route": "GET /users",
      "contract": {
        "file": "list.contract.ts",
        "routes": { "GET /users": "listUsers" },
        "imports": { "framework": ["logger"], "external": [] }
      },
      "logic": { "file": "list.logic.ts", "exports": ["listUsers"] },
      "test": {
        "file": "list.test.ts",
        "test_cases": [{ "name": "lists users" }]
      }
    }
  },
  "validation_targets": {}
}
"#;

pub const CONTRACT: &str = r#"
export const CONTRACT = {
  routes: {
    'GET /users/:id': 'getUser',
  },
  imports: {
    framework: ['auth', 'logger'],
    external: [],
  },
  tests: [
    'returns user when found',
    'returns 404 when user is missing',
  ],
};
"#;

pub const LOGIC: &str = r#"
import { authClass } from '@voilajsx/appkit/auth';
import { loggerClass } from '@voilajsx/appkit/logger';
import type { Request, Response } from './types';

const auth = authClass.get();
const logger = loggerClass.get('users');

export async function getUser(req: Request, res: Response) {
  const requestId = req.headers['x-request-id'];
  try {
    const user = await auth.findUser(req.params.id);
    if (!user) {
      return res.status(404).json({ error: 'not found' });
    }
    logger.info('user fetched', { requestId });
    return res.json(user);
  } catch (err) {
    logger.error('user lookup failed', { requestId, err });
    return res.status(500).json({ error: 'internal' });
  }
}
"#;

pub const TEST: &str = r#"
import { getUser } from './get.logic';

describe('GET /users/:id', () => {
  test('returns user when found', async () => {
    await getUser(mockRequest({ id: '1' }), mockResponse());
  });

  it('returns 404 when user is missing', async () => {
    await getUser(mockRequest({ id: 'nope' }), mockResponse());
  });
});
"#;

pub const LIST_CONTRACT: &str = r#"
export const CONTRACT = {
  routes: { "GET /users": "listUsers" },
  imports: { framework: ["logger"], external: [] },
  tests: ["lists users"],
};
"#;

pub const LIST_LOGIC: &str = r#"
import { loggerClass } from '@voilajsx/appkit/logger';
import type { Request, Response } from './types';

const logger = loggerClass.get('users');

export const listUsers = async (req: Request, res: Response) => {
  const requestId = req.headers['x-request-id'];
  try {
    const page = Number(req.query.page ?? 1);
    logger.info('listing users', { requestId, page });
    return res.json({ page, users: [] });
  } catch (err) {
    logger.error('listing failed', { requestId, err });
    return res.status(500).json({ error: 'internal' });
  }
};
"#;

pub const LIST_TEST: &str = r#"
import { listUsers } from './list.logic';

test('lists users', async () => {
  await listUsers(mockRequest({}), mockResponse());
});
"#;

/// The parsed `users` specification
pub fn feature_spec() -> FeatureSpec {
    FeatureSpec::from_json_str(SPEC_JSON).expect("fixture specification parses")
}

/// Specification entry of `users/get`
pub fn endpoint_spec() -> EndpointSpec {
    feature_spec()
        .endpoints
        .remove("get")
        .expect("fixture declares users/get")
}

/// Files of the `users` feature, relative to the project root
pub fn users_feature_files() -> Vec<(&'static str, String)> {
    vec![
        ("src/features/users/users.spec.json", SPEC_JSON.to_string()),
        ("src/features/users/get/get.contract.ts", CONTRACT.to_string()),
        ("src/features/users/get/get.logic.ts", LOGIC.to_string()),
        ("src/features/users/get/get.test.ts", TEST.to_string()),
        ("src/features/users/list/list.contract.ts", LIST_CONTRACT.to_string()),
        ("src/features/users/list/list.logic.ts", LIST_LOGIC.to_string()),
        ("src/features/users/list/list.test.ts", LIST_TEST.to_string()),
    ]
}

/// The `users` feature rooted at `/p`
pub fn users_get_fs() -> MemoryFileSystem {
    MemoryFileSystem::new().with_files(
        users_feature_files()
            .into_iter()
            .map(|(path, content)| (format!("/p/{}", path), content)),
    )
}
