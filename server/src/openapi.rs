use entity::Employee;
use utoipa::OpenApi;

use crate::employees;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Records API",
        description = "Create, read, update and delete employee records."
    ),
    paths(
        employees::list_employees,
        employees::get_employee,
        employees::create_employee,
        employees::update_employee,
        employees::delete_employee,
        employees::delete_employee_by_query,
    ),
    components(schemas(Employee)),
    tags((name = "employees", description = "Employee record management"))
)]
pub struct ApiDoc;

pub fn render_pretty() -> anyhow::Result<String> {
    Ok(ApiDoc::openapi().to_pretty_json()?)
}
