//! Operation catalog: the single source of truth for advertised tools and request templates.
//!
//! A catalog is built once (from the built-in pet-store table or a YAML document), checked for
//! consistency, and then only read.

use crate::config::{CatalogConfig, FieldConfig, FieldLocation, OperationConfig, Property, Shape};
use crate::error::{HttpToolsError, Result};
use reqwest::Method;
use rmcp::model::{JsonObject, Tool};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// A validated operation descriptor.
#[derive(Debug, Clone)]
pub struct Operation {
    name: String,
    description: Option<String>,
    method: Method,
    path: String,
    fields: Vec<FieldConfig>,
    input_schema: Arc<JsonObject>,
}

impl Operation {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL template, always starting with `/`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldConfig] {
        &self.fields
    }

    #[must_use]
    pub fn input_schema(&self) -> &Arc<JsonObject> {
        &self.input_schema
    }

    /// Discovery summary (`name`, `description`, `inputSchema`).
    #[must_use]
    pub fn summary(&self) -> OperationSummary {
        OperationSummary {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            input_schema: Value::Object(self.input_schema.as_ref().clone()),
        }
    }

    /// MCP `Tool` for this operation, annotated from its HTTP method.
    #[must_use]
    pub fn to_tool(&self) -> Tool {
        let mut tool = Tool::new(
            self.name.clone(),
            self.description.clone().unwrap_or_default(),
            Arc::clone(&self.input_schema),
        );
        tool.annotations = Some(crate::semantics::annotations_for_method(&self.method));
        tool
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    operations: Vec<Operation>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from operation configs, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns a config error on duplicate operation or field names, invalid HTTP methods, or
    /// when URL placeholders and `path` fields do not match one-to-one.
    pub fn new(configs: Vec<OperationConfig>) -> Result<Self> {
        let mut operations = Vec::with_capacity(configs.len());
        let mut index = HashMap::with_capacity(configs.len());

        for cfg in configs {
            if index.contains_key(&cfg.name) {
                return Err(HttpToolsError::Config(format!(
                    "Duplicate operation name '{}'",
                    cfg.name
                )));
            }
            let op = compile_operation(cfg)?;
            index.insert(op.name.clone(), operations.len());
            operations.push(op);
        }

        Ok(Self { operations, index })
    }

    /// The built-in Swagger pet-store catalog.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in table violates catalog invariants.
    pub fn petstore() -> Result<Self> {
        Self::new(petstore_operations())
    }

    /// Parse a YAML catalog document (`operations: [...]`).
    ///
    /// # Errors
    ///
    /// Returns a config error if the YAML is malformed or the operations are inconsistent.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: CatalogConfig = serde_yaml::from_str(yaml)
            .map_err(|e| HttpToolsError::Config(format!("Invalid catalog YAML: {e}")))?;
        Self::new(cfg.operations)
    }

    /// Load a YAML catalog from disk.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            HttpToolsError::Config(format!("Failed to read catalog '{}': {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Resolve an operation by name.
    ///
    /// # Errors
    ///
    /// Returns [`HttpToolsError::UnknownOperation`] if the name is not declared.
    pub fn lookup(&self, name: &str) -> Result<&Operation> {
        self.index
            .get(name)
            .map(|&i| &self.operations[i])
            .ok_or_else(|| HttpToolsError::UnknownOperation(name.to_string()))
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Summaries in declaration order.
    #[must_use]
    pub fn summaries(&self) -> Vec<OperationSummary> {
        self.operations.iter().map(Operation::summary).collect()
    }

    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.operations.iter().map(Operation::to_tool).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

fn compile_operation(cfg: OperationConfig) -> Result<Operation> {
    let OperationConfig {
        name,
        method,
        path,
        description,
        fields,
    } = cfg;

    if name.trim().is_empty() {
        return Err(HttpToolsError::Config(
            "Operation name must not be empty".to_string(),
        ));
    }

    let method_str = method.trim();
    let method: Method = method_str.to_uppercase().parse().map_err(|_| {
        HttpToolsError::Config(format!(
            "Invalid HTTP method '{method_str}' in operation '{name}'"
        ))
    })?;

    let path = if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    };

    let mut seen: HashSet<&str> = HashSet::new();
    for f in &fields {
        if !seen.insert(f.name.as_str()) {
            return Err(HttpToolsError::Config(format!(
                "Duplicate field '{}' in operation '{name}'",
                f.name
            )));
        }
    }

    let body_fields: Vec<&str> = fields
        .iter()
        .filter(|f| f.location == FieldLocation::Body)
        .map(|f| f.name.as_str())
        .collect();
    if body_fields.len() > 1 && body_fields.contains(&"body") {
        return Err(HttpToolsError::Config(format!(
            "Field 'body' in operation '{name}' is the whole payload and cannot be combined with \
             other body fields ({})",
            body_fields.join(", ")
        )));
    }

    let placeholders = template_placeholders(&path).map_err(|e| {
        HttpToolsError::Config(format!("Invalid path template in operation '{name}': {e}"))
    })?;
    let path_fields: HashSet<&str> = fields
        .iter()
        .filter(|f| f.location == FieldLocation::Path)
        .map(|f| f.name.as_str())
        .collect();

    let mut used: HashSet<&str> = HashSet::new();
    for p in &placeholders {
        if !path_fields.contains(p.as_str()) {
            return Err(HttpToolsError::Config(format!(
                "Placeholder '{{{p}}}' in operation '{name}' has no matching path field"
            )));
        }
        if !used.insert(p.as_str()) {
            return Err(HttpToolsError::Config(format!(
                "Placeholder '{{{p}}}' appears more than once in operation '{name}'"
            )));
        }
    }
    if let Some(unused) = path_fields.iter().find(|f| !used.contains(**f)) {
        return Err(HttpToolsError::Config(format!(
            "Path field '{unused}' in operation '{name}' is not used by template '{path}'"
        )));
    }

    let input_schema = Arc::new(build_input_schema(&fields));

    Ok(Operation {
        name,
        description,
        method,
        path,
        fields,
        input_schema,
    })
}

/// Extract `{name}` placeholders from a URL template, in order.
pub(crate) fn template_placeholders(path: &str) -> std::result::Result<Vec<String>, String> {
    let mut out = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            return Err(format!("unclosed '{{' in '{path}'"));
        };
        let name = &after[..end];
        if name.is_empty() || name.contains('{') {
            return Err(format!("malformed placeholder in '{path}'"));
        }
        out.push(name.to_string());
        rest = &after[end + 1..];
    }
    if rest.contains('}') {
        return Err(format!("unmatched '}}' in '{path}'"));
    }
    Ok(out)
}

fn build_input_schema(fields: &[FieldConfig]) -> JsonObject {
    let mut properties = serde_json::Map::new();
    let mut required: Vec<String> = Vec::new();

    for f in fields {
        properties.insert(f.name.clone(), f.shape.to_json_schema());
        if f.required {
            required.push(f.name.clone());
        }
    }

    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }

    schema.as_object().cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------------------------
// Built-in pet-store table
// ---------------------------------------------------------------------------------------------

fn op(
    name: &str,
    method: &str,
    path: &str,
    description: &str,
    fields: Vec<FieldConfig>,
) -> OperationConfig {
    OperationConfig {
        name: name.to_string(),
        method: method.to_string(),
        path: path.to_string(),
        description: Some(description.to_string()),
        fields,
    }
}

fn field(name: &str, location: FieldLocation, shape: Shape) -> FieldConfig {
    FieldConfig {
        name: name.to_string(),
        location,
        required: true,
        shape,
    }
}

fn path_param(name: &str, description: &str) -> FieldConfig {
    field(
        name,
        FieldLocation::Path,
        Shape::string().describe(description),
    )
}

fn query_param(name: &str, description: &str) -> FieldConfig {
    field(
        name,
        FieldLocation::Query,
        Shape::string().describe(description),
    )
}

fn body(shape: Shape) -> FieldConfig {
    field("body", FieldLocation::Body, shape)
}

fn id_name_shape() -> Shape {
    Shape::object(vec![
        Property::optional("id", Shape::integer()),
        Property::optional("name", Shape::string()),
    ])
}

fn pet_shape() -> Shape {
    Shape::object(vec![
        Property::optional("id", Shape::integer()),
        Property::optional("category", id_name_shape()),
        Property::required("name", Shape::string()),
        Property::required("photoUrls", Shape::array(Shape::string())),
        Property::optional("tags", Shape::array(id_name_shape())),
        Property::optional(
            "status",
            Shape::string()
                .one_of(&["available", "pending", "sold"])
                .describe("pet status in the store"),
        ),
    ])
    .describe("Pet object that needs to be added to the store")
}

fn order_shape() -> Shape {
    Shape::object(vec![
        Property::optional("id", Shape::integer()),
        Property::optional("petId", Shape::integer()),
        Property::optional("quantity", Shape::integer()),
        Property::optional("shipDate", Shape::string()),
        Property::optional(
            "status",
            Shape::string()
                .one_of(&["placed", "approved", "delivered"])
                .describe("Order Status"),
        ),
        Property::optional("complete", Shape::boolean()),
    ])
    .describe("order placed for purchasing the pet")
}

fn user_shape() -> Shape {
    Shape::object(vec![
        Property::optional("id", Shape::integer()),
        Property::optional("username", Shape::string()),
        Property::optional("firstName", Shape::string()),
        Property::optional("lastName", Shape::string()),
        Property::optional("email", Shape::string()),
        Property::optional("password", Shape::string()),
        Property::optional("phone", Shape::string()),
        Property::optional("userStatus", Shape::integer().describe("User Status")),
    ])
}

#[allow(clippy::too_many_lines)]
fn petstore_operations() -> Vec<OperationConfig> {
    vec![
        op(
            "uploadFile",
            "POST",
            "/pet/{petId}/uploadImage",
            "uploads an image",
            vec![path_param("petId", "ID of pet to update")],
        ),
        op(
            "addPet",
            "POST",
            "/pet",
            "Add a new pet to the store",
            vec![body(pet_shape())],
        ),
        op(
            "updatePet",
            "PUT",
            "/pet",
            "Update an existing pet",
            vec![body(pet_shape())],
        ),
        op(
            "findPetsByStatus",
            "GET",
            "/pet/findByStatus",
            "Finds Pets by status",
            vec![query_param(
                "status",
                "Status values that need to be considered for filter",
            )],
        ),
        op(
            "findPetsByTags",
            "GET",
            "/pet/findByTags",
            "Finds Pets by tags",
            vec![query_param("tags", "Tags to filter by")],
        ),
        op(
            "getPetById",
            "GET",
            "/pet/{petId}",
            "Find pet by ID",
            vec![path_param("petId", "ID of pet to return")],
        ),
        op(
            "updatePetWithForm",
            "POST",
            "/pet/{petId}",
            "Updates a pet in the store with form data",
            vec![path_param("petId", "ID of pet that needs to be updated")],
        ),
        op(
            "deletePet",
            "DELETE",
            "/pet/{petId}",
            "Deletes a pet",
            vec![path_param("petId", "Pet id to delete")],
        ),
        op(
            "getInventory",
            "GET",
            "/store/inventory",
            "Returns pet inventories by status",
            Vec::new(),
        ),
        op(
            "placeOrder",
            "POST",
            "/store/order",
            "Place an order for a pet",
            vec![body(order_shape())],
        ),
        op(
            "getOrderById",
            "GET",
            "/store/order/{orderId}",
            "Find purchase order by ID",
            vec![path_param("orderId", "ID of pet that needs to be fetched")],
        ),
        op(
            "deleteOrder",
            "DELETE",
            "/store/order/{orderId}",
            "Delete purchase order by ID",
            vec![path_param(
                "orderId",
                "ID of the order that needs to be deleted",
            )],
        ),
        op(
            "createUsersWithListInput",
            "POST",
            "/user/createWithList",
            "Creates list of users with given input array",
            vec![body(Shape::array(user_shape()).describe("List of user object"))],
        ),
        op(
            "getUserByName",
            "GET",
            "/user/{username}",
            "Get user by user name",
            vec![path_param(
                "username",
                "The name that needs to be fetched. Use user1 for testing. ",
            )],
        ),
        op(
            "updateUser",
            "PUT",
            "/user/{username}",
            "Updated user",
            vec![
                path_param("username", "name that need to be updated"),
                body(user_shape().describe("Updated user object")),
            ],
        ),
        op(
            "deleteUser",
            "DELETE",
            "/user/{username}",
            "Delete user",
            vec![path_param("username", "The name that needs to be deleted")],
        ),
        op(
            "loginUser",
            "GET",
            "/user/login",
            "Logs user into the system",
            vec![
                query_param("username", "The user name for login"),
                query_param("password", "The password for login in clear text"),
            ],
        ),
        op(
            "logoutUser",
            "GET",
            "/user/logout",
            "Logs out current logged in user session",
            Vec::new(),
        ),
        op(
            "createUsersWithArrayInput",
            "POST",
            "/user/createWithArray",
            "Creates list of users with given input array",
            vec![body(Shape::array(user_shape()).describe("List of user object"))],
        ),
        op(
            "createUser",
            "POST",
            "/user",
            "Create user",
            vec![body(user_shape().describe("Created user object"))],
        ),
    ]
}
